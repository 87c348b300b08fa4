// src/models/timetable.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "day_of_week", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Todos os dias, na ordem em que aparecem na grade.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];
}

// ---
// Horários "HH:MM"
// ---

/// Converte "HH:MM" (24h) num horário. Aceita apenas o formato estrito.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    // O chrono aceita espaços antes dos números; aqui são exatamente "DD:DD"
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn validate_clock(value: &str) -> Result<(), ValidationError> {
    if parse_clock(value).is_none() {
        let mut err = ValidationError::new("clock");
        err.message = Some("O horário deve estar no formato HH:MM.".into());
        return Err(err);
    }
    Ok(())
}

// Início antes do fim. Horários inválidos já são reportados pelo validate_clock.
fn check_window(start: &str, end: &str, code: &'static str) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (parse_clock(start), parse_clock(end)) {
        if start >= end {
            let mut err = ValidationError::new(code);
            err.message = Some("O horário inicial deve ser anterior ao final.".into());
            return Err(err);
        }
    }
    Ok(())
}

// ---
// 1. Intervalos (Recreio, Almoço...)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_break_window"))]
pub struct BreakSlot {
    #[validate(length(min = 1, message = "O nome do intervalo é obrigatório."))]
    #[schema(example = "Lunch")]
    pub name: String,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "12:00")]
    pub start_time: String,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "12:40")]
    pub end_time: String,
}

fn validate_break_window(slot: &BreakSlot) -> Result<(), ValidationError> {
    check_window(&slot.start_time, &slot.end_time, "break_window")
}

// ---
// 2. Configuração da grade (uma por tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableConfig {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = 8)]
    pub periods_per_day: i32,
    #[schema(example = 40)]
    pub default_duration: i32,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "14:00")]
    pub end_time: String,
    #[sqlx(json)]
    pub break_slots: Vec<BreakSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableConfig {
    /// Aplica um patch parcial sobre a configuração salva.
    pub fn merged_with(&self, patch: &ConfigPatchPayload) -> ConfigPayload {
        ConfigPayload {
            periods_per_day: patch.periods_per_day.unwrap_or(self.periods_per_day),
            default_duration: patch.default_duration.unwrap_or(self.default_duration),
            start_time: patch.start_time.clone().unwrap_or_else(|| self.start_time.clone()),
            end_time: patch.end_time.clone().unwrap_or_else(|| self.end_time.clone()),
            break_slots: patch.break_slots.clone().unwrap_or_else(|| self.break_slots.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_day_window"))]
pub struct ConfigPayload {
    #[validate(range(min = 1, max = 12, message = "periodsPerDay deve estar entre 1 e 12."))]
    #[schema(example = 8, minimum = 1, maximum = 12)]
    pub periods_per_day: i32,

    #[validate(range(min = 30, max = 120, message = "defaultDuration deve estar entre 30 e 120 minutos."))]
    #[schema(example = 40, minimum = 30, maximum = 120)]
    pub default_duration: i32,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "08:00")]
    pub start_time: String,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "14:00")]
    pub end_time: String,

    #[validate(nested)]
    #[schema(example = json!([{ "name": "Lunch", "startTime": "12:00", "endTime": "12:40" }]))]
    pub break_slots: Vec<BreakSlot>,
}

fn validate_day_window(payload: &ConfigPayload) -> Result<(), ValidationError> {
    check_window(&payload.start_time, &payload.end_time, "day_window")
}

/// PUT /time-table/config: só os campos enviados mudam.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatchPayload {
    #[schema(example = 7)]
    pub periods_per_day: Option<i32>,
    pub default_duration: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_slots: Option<Vec<BreakSlot>>,
}

// ---
// 3. Aula na grade (Slot)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlot {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub day_of_week: DayOfWeek,
    #[schema(example = 1)]
    pub period_number: i32,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "08:40")]
    pub end_time: String,
    #[schema(example = 40)]
    pub duration: i32,
    pub division_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableSlot {
    pub fn timing(&self) -> SlotTiming<'_> {
        SlotTiming {
            period_number: self.period_number,
            duration: self.duration,
            start_time: &self.start_time,
            end_time: &self.end_time,
        }
    }

    /// Monta o candidato de uma edição: o que veio no patch, senão o valor atual.
    pub fn merged_with(&self, patch: &SlotPatchPayload) -> SlotPayload {
        SlotPayload {
            day_of_week: patch.day_of_week.unwrap_or(self.day_of_week),
            period_number: patch.period_number.unwrap_or(self.period_number),
            start_time: patch.start_time.clone().unwrap_or_else(|| self.start_time.clone()),
            end_time: patch.end_time.clone().unwrap_or_else(|| self.end_time.clone()),
            duration: patch.duration.unwrap_or(self.duration),
            division_id: patch.division_id.unwrap_or(self.division_id),
            subject_id: patch.subject_id.unwrap_or(self.subject_id),
            teacher_id: patch.teacher_id.unwrap_or(self.teacher_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_slot_window"))]
pub struct SlotPayload {
    #[schema(example = "MONDAY")]
    pub day_of_week: DayOfWeek,

    #[validate(range(min = 1, message = "periodNumber deve ser maior ou igual a 1."))]
    #[schema(example = 1, minimum = 1)]
    pub period_number: i32,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "08:00")]
    pub start_time: String,

    #[validate(custom(function = "validate_clock"))]
    #[schema(example = "08:40")]
    pub end_time: String,

    #[validate(range(min = 1, message = "duration deve ser maior ou igual a 1."))]
    #[schema(example = 40, minimum = 1)]
    pub duration: i32,

    pub division_id: Uuid,
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
}

fn validate_slot_window(payload: &SlotPayload) -> Result<(), ValidationError> {
    check_window(&payload.start_time, &payload.end_time, "slot_window")
}

impl SlotPayload {
    pub fn timing(&self) -> SlotTiming<'_> {
        SlotTiming {
            period_number: self.period_number,
            duration: self.duration,
            start_time: &self.start_time,
            end_time: &self.end_time,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatchPayload {
    pub day_of_week: Option<DayOfWeek>,
    pub period_number: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<i32>,
    pub division_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}

/// A parte de um slot que a configuração restringe.
#[derive(Debug, Clone, Copy)]
pub struct SlotTiming<'a> {
    pub period_number: i32,
    pub duration: i32,
    pub start_time: &'a str,
    pub end_time: &'a str,
}

// ---
// 4. Grade agrupada por dia (divisão ou professor)
// ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: DayOfWeek,
    pub slots: Vec<TimetableSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: DayOfWeek, period: i32) -> TimetableSlot {
        let now = Utc::now();
        TimetableSlot {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            day_of_week: day,
            period_number: period,
            start_time: "08:00".into(),
            end_time: "08:40".into(),
            duration: 40,
            division_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parse_clock_is_strict() {
        assert!(parse_clock("08:00").is_some());
        assert!(parse_clock("23:59").is_some());
        assert!(parse_clock("8:00").is_none());
        assert!(parse_clock("24:00").is_none());
        assert!(parse_clock("08:00:00").is_none());
        assert!(parse_clock("ab:cd").is_none());
        assert!(parse_clock(" 8:00").is_none());
        assert!(parse_clock("08: 5").is_none());
        assert!(parse_clock("08-00").is_none());
        assert!(parse_clock("+8:00").is_none());
    }

    #[test]
    fn day_of_week_uses_screaming_case_on_the_wire() {
        let json = serde_json::to_string(&DayOfWeek::Wednesday).unwrap();
        assert_eq!(json, "\"WEDNESDAY\"");
        let day: DayOfWeek = serde_json::from_str("\"SUNDAY\"").unwrap();
        assert_eq!(day, DayOfWeek::Sunday);
    }

    #[test]
    fn config_payload_requires_break_slots() {
        let raw = serde_json::json!({
            "periodsPerDay": 8,
            "defaultDuration": 40,
            "startTime": "08:00",
            "endTime": "14:00"
        });
        assert!(serde_json::from_value::<ConfigPayload>(raw).is_err());
    }

    #[test]
    fn config_payload_rejects_out_of_range_fields() {
        let payload = ConfigPayload {
            periods_per_day: 13,
            default_duration: 20,
            start_time: "08:00".into(),
            end_time: "14:00".into(),
            break_slots: vec![],
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("periods_per_day"));
        assert!(fields.contains_key("default_duration"));
    }

    #[test]
    fn config_payload_rejects_inverted_break() {
        let payload = ConfigPayload {
            periods_per_day: 8,
            default_duration: 40,
            start_time: "08:00".into(),
            end_time: "14:00".into(),
            break_slots: vec![BreakSlot {
                name: "Lunch".into(),
                start_time: "12:40".into(),
                end_time: "12:00".into(),
            }],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn slot_payload_rejects_bad_clock_and_inverted_window() {
        let mut payload = SlotPayload {
            day_of_week: DayOfWeek::Monday,
            period_number: 1,
            start_time: "8h".into(),
            end_time: "08:40".into(),
            duration: 40,
            division_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
        };
        assert!(payload.validate().is_err());

        payload.start_time = "09:00".into();
        assert!(payload.validate().is_err());

        payload.start_time = "08:00".into();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn slot_patch_keeps_untouched_fields() {
        let current = slot(DayOfWeek::Tuesday, 3);
        let patch = SlotPatchPayload {
            period_number: Some(4),
            ..Default::default()
        };

        let merged = current.merged_with(&patch);
        assert_eq!(merged.period_number, 4);
        assert_eq!(merged.day_of_week, DayOfWeek::Tuesday);
        assert_eq!(merged.teacher_id, current.teacher_id);
        assert_eq!(merged.start_time, current.start_time);
    }

    #[test]
    fn config_patch_replaces_break_list_as_a_whole() {
        let now = Utc::now();
        let config = TimetableConfig {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            periods_per_day: 8,
            default_duration: 40,
            start_time: "08:00".into(),
            end_time: "14:00".into(),
            break_slots: vec![BreakSlot {
                name: "Lunch".into(),
                start_time: "12:00".into(),
                end_time: "12:40".into(),
            }],
            created_at: now,
            updated_at: now,
        };
        let patch = ConfigPatchPayload {
            break_slots: Some(vec![]),
            ..Default::default()
        };

        let merged = config.merged_with(&patch);
        assert!(merged.break_slots.is_empty());
        assert_eq!(merged.periods_per_day, 8);
    }
}
