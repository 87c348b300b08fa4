// src/services/slot_rules.rs

use crate::{
    common::error::AppError,
    models::timetable::{parse_clock, BreakSlot, ConfigPayload, SlotTiming, TimetableConfig},
};

/// Os limites que a configuração de um tenant impõe a cada aula.
#[derive(Debug, Clone, Copy)]
pub struct SlotRules<'a> {
    pub periods_per_day: i32,
    pub default_duration: i32,
    pub break_slots: &'a [BreakSlot],
}

impl TimetableConfig {
    pub fn rules(&self) -> SlotRules<'_> {
        SlotRules {
            periods_per_day: self.periods_per_day,
            default_duration: self.default_duration,
            break_slots: &self.break_slots,
        }
    }
}

impl ConfigPayload {
    pub fn rules(&self) -> SlotRules<'_> {
        SlotRules {
            periods_per_day: self.periods_per_day,
            default_duration: self.default_duration,
            break_slots: &self.break_slots,
        }
    }
}

impl SlotRules<'_> {
    /// Período, duração e intervalos, nesta ordem. Para no primeiro problema.
    pub fn check(&self, slot: SlotTiming<'_>) -> Result<(), AppError> {
        if slot.period_number > self.periods_per_day {
            return Err(AppError::PeriodOutOfRange { max: self.periods_per_day });
        }

        if slot.duration != self.default_duration {
            return Err(AppError::DurationMismatch { expected: self.default_duration });
        }

        if let Some(hit) = self.overlapping_break(slot.start_time, slot.end_time)? {
            return Err(AppError::BreakOverlap { name: hit.name.clone() });
        }

        Ok(())
    }

    /// Primeiro intervalo que cruza `[start, end)`. Encostar na borda não conta.
    pub fn overlapping_break(&self, start: &str, end: &str) -> Result<Option<&BreakSlot>, AppError> {
        let start = clock(start)?;
        let end = clock(end)?;

        for slot in self.break_slots {
            let break_start = clock(&slot.start_time)?;
            let break_end = clock(&slot.end_time)?;
            if start < break_end && end > break_start {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }
}

fn clock(value: &str) -> Result<chrono::NaiveTime, AppError> {
    parse_clock(value).ok_or_else(|| AppError::InvalidClockTime(value.to_string()))
}
