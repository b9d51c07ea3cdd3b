use time::Time;

use crate::recipes::repo::MealCategory;

const DESAYUNO_DEFAULT: &str = "Parte el día con un buen desayuno";
const DESAYUNO_TRANSITION: &str = "Un último cafecito... ¡ya se acerca el almuerzo!";
const ALMUERZO_REASON: &str = "¿Qué haremos de rico hoy?";
const BREAK_DEFAULT: &str = "Un break dulce para la tarde";
const ONCE_DEFAULT: &str = "Algo rico para la once";

/// Named meal windows of the day, resolved from the weather provider's
/// local clock rather than the server clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSlot {
    Desayuno,
    Almuerzo,
    Break,
    Once,
    Noche,
    General,
}

impl MealSlot {
    /// Total over all valid wall-clock times. `General` stays as the
    /// defensive default even though the ranges below are exhaustive.
    pub fn for_time(at: Time) -> MealSlot {
        let minutes = u16::from(at.hour()) * 60 + u16::from(at.minute());
        match minutes {
            0..=689 => MealSlot::Desayuno,    // 00:00-11:29
            690..=899 => MealSlot::Almuerzo,  // 11:30-14:59
            900..=989 => MealSlot::Break,     // 15:00-16:29
            990..=1199 => MealSlot::Once,     // 16:30-19:59
            1200..=1439 => MealSlot::Noche,   // 20:00-23:59
            _ => MealSlot::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Desayuno => "Desayuno",
            MealSlot::Almuerzo => "Almuerzo",
            MealSlot::Break => "Break",
            MealSlot::Once => "Once",
            MealSlot::Noche => "Noche",
            MealSlot::General => "General",
        }
    }

    /// Recipe category this window draws candidates from.
    pub fn category(&self) -> Option<MealCategory> {
        match self {
            MealSlot::Desayuno => Some(MealCategory::Desayuno),
            MealSlot::Almuerzo => Some(MealCategory::Almuerzo),
            MealSlot::Break => Some(MealCategory::Break),
            MealSlot::Once => Some(MealCategory::Once),
            MealSlot::Noche => Some(MealCategory::Noche),
            MealSlot::General => None,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MealSlot::Desayuno => "☕",
            MealSlot::Almuerzo => "🍲",
            MealSlot::Break => "🍪",
            MealSlot::Once => "🥐",
            MealSlot::Noche => "🌙",
            MealSlot::General => "🤔",
        }
    }

    /// Fixed message used when the window has no matching recipe, and as
    /// the reason when one is picked. Between 11:00 and 11:29 breakfast
    /// switches to a transitional still-breakfast-soon-lunch wording.
    pub fn default_message(&self, at: Time) -> Option<&'static str> {
        match self {
            MealSlot::Desayuno if at.hour() == 11 => Some(DESAYUNO_TRANSITION),
            MealSlot::Desayuno => Some(DESAYUNO_DEFAULT),
            MealSlot::Break => Some(BREAK_DEFAULT),
            MealSlot::Once => Some(ONCE_DEFAULT),
            _ => None,
        }
    }

    pub fn custom_reason(&self) -> Option<&'static str> {
        match self {
            MealSlot::Almuerzo => Some(ALMUERZO_REASON),
            _ => None,
        }
    }
}

#[cfg(test)]
mod slot_tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn lunch_boundary_is_exact_to_the_minute() {
        assert_eq!(MealSlot::for_time(time!(11:29)), MealSlot::Desayuno);
        assert_eq!(MealSlot::for_time(time!(11:30)), MealSlot::Almuerzo);
        assert_eq!(MealSlot::for_time(time!(14:59)), MealSlot::Almuerzo);
        assert_eq!(MealSlot::for_time(time!(15:00)), MealSlot::Break);
    }

    #[test]
    fn remaining_boundaries() {
        assert_eq!(MealSlot::for_time(time!(0:00)), MealSlot::Desayuno);
        assert_eq!(MealSlot::for_time(time!(16:29)), MealSlot::Break);
        assert_eq!(MealSlot::for_time(time!(16:30)), MealSlot::Once);
        assert_eq!(MealSlot::for_time(time!(19:59)), MealSlot::Once);
        assert_eq!(MealSlot::for_time(time!(20:00)), MealSlot::Noche);
        assert_eq!(MealSlot::for_time(time!(23:59)), MealSlot::Noche);
    }

    #[test]
    fn transitional_breakfast_window_changes_message() {
        let slot = MealSlot::Desayuno;
        assert_eq!(
            slot.default_message(time!(9:00)),
            Some(DESAYUNO_DEFAULT)
        );
        assert_eq!(
            slot.default_message(time!(11:00)),
            Some(DESAYUNO_TRANSITION)
        );
        assert_eq!(
            slot.default_message(time!(11:29)),
            Some(DESAYUNO_TRANSITION)
        );
    }

    #[test]
    fn only_lunch_carries_a_custom_reason() {
        assert_eq!(MealSlot::Almuerzo.custom_reason(), Some(ALMUERZO_REASON));
        assert_eq!(MealSlot::Noche.custom_reason(), None);
        assert_eq!(MealSlot::Once.custom_reason(), None);
    }
}
