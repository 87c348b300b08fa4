// src/db/memory_store.rs
//
// TimetableStore em memória para os testes. Reproduz as mesmas regras que as
// constraints do Postgres garantem (unicidade, FKs da config e das referências
// por tenant, RESTRICT).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::timetable_repo::{SlotFilter, TimetableStore},
    models::timetable::{ConfigPayload, DayOfWeek, SlotPayload, TimetableConfig, TimetableSlot},
};

#[derive(Default)]
struct MemoryState {
    configs: HashMap<Uuid, TimetableConfig>,
    slots: Vec<TimetableSlot>,
    // (tenant, professor, matéria)
    qualifications: HashSet<(Uuid, Uuid, Uuid)>,
    // (tenant, id): as FKs compostas das aulas
    divisions: HashSet<(Uuid, Uuid)>,
    subjects: HashSet<(Uuid, Uuid)>,
    teachers: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra que o professor leciona a matéria (o que o módulo de professores faria).
    /// Professor e matéria passam a existir no tenant.
    pub fn qualify(&self, tenant_id: Uuid, teacher_id: Uuid, subject_id: Uuid) {
        let mut state = self.lock();
        state.teachers.insert((tenant_id, teacher_id));
        state.subjects.insert((tenant_id, subject_id));
        state.qualifications.insert((tenant_id, teacher_id, subject_id));
    }

    pub fn register_division(&self, tenant_id: Uuid, division_id: Uuid) {
        self.lock().divisions.insert((tenant_id, division_id));
    }

    pub fn register_subject(&self, tenant_id: Uuid, subject_id: Uuid) {
        self.lock().subjects.insert((tenant_id, subject_id));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store poisoned")
    }
}

impl MemoryState {
    fn teacher_busy(&self, tenant_id: Uuid, payload: &SlotPayload, exclude: Option<Uuid>) -> bool {
        self.slots.iter().any(|s| {
            s.tenant_id == tenant_id
                && s.teacher_id == payload.teacher_id
                && s.day_of_week == payload.day_of_week
                && s.period_number == payload.period_number
                && Some(s.id) != exclude
        })
    }

    // Turma, matéria e professor precisam ser do mesmo tenant da aula
    fn references_exist(&self, tenant_id: Uuid, payload: &SlotPayload) -> bool {
        self.divisions.contains(&(tenant_id, payload.division_id))
            && self.subjects.contains(&(tenant_id, payload.subject_id))
            && self.teachers.contains(&(tenant_id, payload.teacher_id))
    }
}

fn apply(slot: &mut TimetableSlot, payload: &SlotPayload) {
    slot.day_of_week = payload.day_of_week;
    slot.period_number = payload.period_number;
    slot.start_time = payload.start_time.clone();
    slot.end_time = payload.end_time.clone();
    slot.duration = payload.duration;
    slot.division_id = payload.division_id;
    slot.subject_id = payload.subject_id;
    slot.teacher_id = payload.teacher_id;
    slot.updated_at = Utc::now();
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn find_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError> {
        Ok(self.lock().configs.get(&tenant_id).cloned())
    }

    async fn insert_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<TimetableConfig, AppError> {
        let mut state = self.lock();
        if state.configs.contains_key(&tenant_id) {
            return Err(AppError::ConfigAlreadyExists);
        }
        let now = Utc::now();
        let config = TimetableConfig {
            id: Uuid::new_v4(),
            tenant_id,
            periods_per_day: payload.periods_per_day,
            default_duration: payload.default_duration,
            start_time: payload.start_time.clone(),
            end_time: payload.end_time.clone(),
            break_slots: payload.break_slots.clone(),
            created_at: now,
            updated_at: now,
        };
        state.configs.insert(tenant_id, config.clone());
        Ok(config)
    }

    async fn update_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<Option<TimetableConfig>, AppError> {
        let mut state = self.lock();
        let Some(config) = state.configs.get_mut(&tenant_id) else {
            return Ok(None);
        };
        config.periods_per_day = payload.periods_per_day;
        config.default_duration = payload.default_duration;
        config.start_time = payload.start_time.clone();
        config.end_time = payload.end_time.clone();
        config.break_slots = payload.break_slots.clone();
        config.updated_at = Utc::now();
        Ok(Some(config.clone()))
    }

    async fn delete_config(&self, tenant_id: Uuid) -> Result<Option<TimetableConfig>, AppError> {
        let mut state = self.lock();
        if state.slots.iter().any(|s| s.tenant_id == tenant_id) {
            return Ok(None);
        }
        Ok(state.configs.remove(&tenant_id))
    }

    async fn count_slots(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let count = self.lock().slots.iter().filter(|s| s.tenant_id == tenant_id).count();
        Ok(count as i64)
    }

    async fn teacher_slot_taken(
        &self,
        tenant_id: Uuid,
        teacher_id: Uuid,
        day: DayOfWeek,
        period_number: i32,
        exclude_slot_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let state = self.lock();
        Ok(state.slots.iter().any(|s| {
            s.tenant_id == tenant_id
                && s.teacher_id == teacher_id
                && s.day_of_week == day
                && s.period_number == period_number
                && Some(s.id) != exclude_slot_id
        }))
    }

    async fn teacher_teaches_subject(&self, tenant_id: Uuid, teacher_id: Uuid, subject_id: Uuid) -> Result<bool, AppError> {
        Ok(self.lock().qualifications.contains(&(tenant_id, teacher_id, subject_id)))
    }

    async fn insert_slot(&self, tenant_id: Uuid, payload: &SlotPayload) -> Result<TimetableSlot, AppError> {
        let mut state = self.lock();
        if !state.configs.contains_key(&tenant_id) {
            return Err(AppError::ConfigNotFound);
        }
        if state.teacher_busy(tenant_id, payload, None) {
            return Err(AppError::TeacherAlreadyAssigned);
        }
        if !state.references_exist(tenant_id, payload) {
            return Err(AppError::ReferenceNotFound);
        }
        let now = Utc::now();
        let mut slot = TimetableSlot {
            id: Uuid::new_v4(),
            tenant_id,
            day_of_week: payload.day_of_week,
            period_number: payload.period_number,
            start_time: String::new(),
            end_time: String::new(),
            duration: payload.duration,
            division_id: payload.division_id,
            subject_id: payload.subject_id,
            teacher_id: payload.teacher_id,
            created_at: now,
            updated_at: now,
        };
        apply(&mut slot, payload);
        state.slots.push(slot.clone());
        Ok(slot)
    }

    async fn update_slot(&self, tenant_id: Uuid, slot_id: Uuid, payload: &SlotPayload) -> Result<Option<TimetableSlot>, AppError> {
        let mut state = self.lock();
        if state.teacher_busy(tenant_id, payload, Some(slot_id)) {
            return Err(AppError::TeacherAlreadyAssigned);
        }
        let exists = state
            .slots
            .iter()
            .any(|s| s.id == slot_id && s.tenant_id == tenant_id);
        if exists && !state.references_exist(tenant_id, payload) {
            return Err(AppError::ReferenceNotFound);
        }
        let Some(slot) = state
            .slots
            .iter_mut()
            .find(|s| s.id == slot_id && s.tenant_id == tenant_id)
        else {
            return Ok(None);
        };
        apply(slot, payload);
        Ok(Some(slot.clone()))
    }

    async fn delete_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError> {
        let mut state = self.lock();
        let position = state
            .slots
            .iter()
            .position(|s| s.id == slot_id && s.tenant_id == tenant_id);
        Ok(position.map(|i| state.slots.remove(i)))
    }

    async fn find_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<Option<TimetableSlot>, AppError> {
        let state = self.lock();
        Ok(state
            .slots
            .iter()
            .find(|s| s.id == slot_id && s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_slots(&self, tenant_id: Uuid, filter: SlotFilter) -> Result<Vec<TimetableSlot>, AppError> {
        let state = self.lock();
        Ok(state
            .slots
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| match filter {
                SlotFilter::All => true,
                SlotFilter::Division(id) => s.division_id == id,
                SlotFilter::Teacher(id) => s.teacher_id == id,
            })
            .cloned()
            .collect())
    }
}
