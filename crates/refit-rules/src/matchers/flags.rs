//! Values for enums marked `[Flags]`

use refit_core::syntax::ast::{AstNode, EnumDeclaration};
use refit_core::{IntegralType, SemanticModel};

/// How the next free flag value is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagValueMode {
    /// Lowest power of two not taken yet
    UseAllAvailable,
    /// Double the highest power of two taken so far; nothing follows `0`
    StartFromHighest,
}

/// A `[Flags]` enum and its explicitly valued members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsEnum {
    pub underlying: IntegralType,
    /// Values of members written with `= value`, in member order
    pub values: Vec<i128>,
}

impl FlagsEnum {
    /// Facts about `declaration`, or `None` if it is not a flags enum
    pub fn of(declaration: &EnumDeclaration, model: &dyn SemanticModel) -> Option<Self> {
        let ty = model.declared_symbol(declaration.syntax())?.ty?;
        if !ty.has_flags_attribute {
            return None;
        }
        let values = declaration
            .members()
            .filter(|member| member.equals_value().is_some())
            .filter_map(|member| model.constant_value(member.syntax())?.as_i128())
            .collect();
        Some(Self {
            underlying: ty.enum_underlying.unwrap_or(IntegralType::INT),
            values,
        })
    }

    pub fn next_value(&self, mode: FlagValueMode) -> Option<i128> {
        next_flag_value(&self.values, mode, self.underlying)
    }
}

fn is_power_of_two_or_zero(value: i128) -> bool {
    value >= 0 && value & (value - 1).max(0) == 0
}

/// Next value to give a member of a flags enum that already uses `values`
///
/// An enum without values starts at `0`. `None` means the next power of
/// two does not fit `underlying`.
pub fn next_flag_value(values: &[i128], mode: FlagValueMode, underlying: IntegralType) -> Option<i128> {
    if values.is_empty() {
        return Some(0);
    }
    let max = underlying.max_flag_power();
    match mode {
        FlagValueMode::UseAllAvailable => {
            let mut candidate = 1i128;
            while candidate <= max {
                if !values.contains(&candidate) {
                    return Some(candidate);
                }
                candidate *= 2;
            }
            None
        }
        FlagValueMode::StartFromHighest => {
            let highest = values
                .iter()
                .copied()
                .filter(|&v| is_power_of_two_or_zero(v))
                .max()?;
            let next = highest * 2;
            (next > 0 && next <= max).then_some(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_enum_starts_at_zero() {
        assert_eq!(
            next_flag_value(&[], FlagValueMode::UseAllAvailable, IntegralType::INT),
            Some(0)
        );
        assert_eq!(
            next_flag_value(&[], FlagValueMode::StartFromHighest, IntegralType::INT),
            Some(0)
        );
    }

    #[test]
    fn test_use_all_available_fills_gaps() {
        let values = [0, 1, 4];
        assert_eq!(
            next_flag_value(&values, FlagValueMode::UseAllAvailable, IntegralType::INT),
            Some(2)
        );
        assert_eq!(
            next_flag_value(&values, FlagValueMode::StartFromHighest, IntegralType::INT),
            Some(8)
        );
    }

    #[test]
    fn test_composite_values_are_ignored_by_highest() {
        assert_eq!(
            next_flag_value(&[1, 3], FlagValueMode::StartFromHighest, IntegralType::INT),
            Some(2)
        );
        assert_eq!(
            next_flag_value(&[3, 5], FlagValueMode::StartFromHighest, IntegralType::INT),
            None
        );
    }

    #[test]
    fn test_highest_zero_gives_no_value() {
        assert_eq!(
            next_flag_value(&[0], FlagValueMode::StartFromHighest, IntegralType::INT),
            None
        );
        assert_eq!(
            next_flag_value(&[0, 3], FlagValueMode::StartFromHighest, IntegralType::INT),
            None
        );
        assert_eq!(
            next_flag_value(&[0], FlagValueMode::UseAllAvailable, IntegralType::INT),
            Some(1)
        );
    }

    #[test]
    fn test_overflow_gives_no_value() {
        assert_eq!(
            next_flag_value(&[64], FlagValueMode::StartFromHighest, IntegralType::SBYTE),
            None
        );
        assert_eq!(
            next_flag_value(&[64], FlagValueMode::StartFromHighest, IntegralType::BYTE),
            Some(128)
        );
        let all: Vec<i128> = (0..8).map(|shift| 1 << shift).collect();
        assert_eq!(
            next_flag_value(&all, FlagValueMode::UseAllAvailable, IntegralType::BYTE),
            None
        );
    }
}
