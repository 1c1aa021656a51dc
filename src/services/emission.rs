// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip emission calculation.

use crate::models::{round_kg, FuelCategory};
use rust_decimal::Decimal;

/// kg CO2 per liter of petrol.
pub const PETROL_FACTOR: Decimal = Decimal::from_parts(231, 0, 0, false, 2);
/// kg CO2 per liter of diesel.
pub const DIESEL_FACTOR: Decimal = Decimal::from_parts(268, 0, 0, false, 2);
/// kg CO2 per kg of CNG.
pub const CNG_FACTOR: Decimal = Decimal::from_parts(16, 0, 0, false, 1);
/// kg CO2 per kWh of grid electricity.
pub const ELECTRIC_FACTOR: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Emission factor for a fuel category. Unknown fuels contribute nothing.
pub fn emission_factor(category: &FuelCategory) -> Decimal {
    match category {
        FuelCategory::Petrol => PETROL_FACTOR,
        FuelCategory::Diesel => DIESEL_FACTOR,
        FuelCategory::Cng => CNG_FACTOR,
        FuelCategory::Electric => ELECTRIC_FACTOR,
        FuelCategory::Other(_) => Decimal::ZERO,
    }
}

/// Emission (kg CO2, 2 dp) of driving `distance_km` at `fuel_efficiency`
/// km per unit of fuel.
///
/// Never fails: a non-positive efficiency gives 0, as does arithmetic
/// overflow on absurd inputs.
pub fn compute_emission(
    category: &FuelCategory,
    fuel_efficiency: Decimal,
    distance_km: Decimal,
) -> Decimal {
    if fuel_efficiency <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    distance_km
        .checked_mul(emission_factor(category))
        .and_then(|v| v.checked_div(fuel_efficiency))
        .map(round_kg)
        .unwrap_or(Decimal::ZERO)
}
