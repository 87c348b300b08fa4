// src/services/timetable_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{SlotFilter, TimetableStore},
    models::timetable::{
        ConfigPatchPayload, ConfigPayload, DayOfWeek, DaySchedule, SlotPatchPayload, SlotPayload,
        TimetableConfig, TimetableSlot,
    },
};

#[derive(Clone)]
pub struct TimetableService {
    store: Arc<dyn TimetableStore>,
}

impl TimetableService {
    pub fn new(store: Arc<dyn TimetableStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    //  CONFIGURAÇÃO
    // =========================================================================

    pub async fn create_config(&self, tenant_id: Uuid, payload: &ConfigPayload) -> Result<TimetableConfig, AppError> {
        // Atalho amigável; a UNIQUE(tenant_id) resolve a corrida de verdade
        if self.store.find_config(tenant_id).await?.is_some() {
            return Err(AppError::ConfigAlreadyExists);
        }

        let config = self.store.insert_config(tenant_id, payload).await?;
        tracing::info!(%tenant_id, periods_per_day = config.periods_per_day, "Configuração da grade criada");
        Ok(config)
    }

    pub async fn get_config(&self, tenant_id: Uuid) -> Result<TimetableConfig, AppError> {
        self.store
            .find_config(tenant_id)
            .await?
            .ok_or(AppError::ConfigNotFound)
    }

    /// Aplica o patch e só grava se nenhuma aula existente ficar fora das novas regras.
    pub async fn update_config(&self, tenant_id: Uuid, patch: &ConfigPatchPayload) -> Result<TimetableConfig, AppError> {
        // 1. Precisa existir
        let current = self.get_config(tenant_id).await?;

        // 2. O resultado do merge tem que ser uma configuração válida por inteiro
        let merged = current.merged_with(patch);
        merged.validate()?;

        // 3. Revalida as aulas já criadas contra as novas regras
        let rules = merged.rules();
        let slots = self.store.list_slots(tenant_id, SlotFilter::All).await?;
        let stranded = slots
            .iter()
            .filter(|slot| rules.check(slot.timing()).is_err())
            .count();

        if stranded > 0 {
            tracing::debug!(%tenant_id, stranded, "Alteração de configuração recusada");
            return Err(AppError::ConfigStrandsSlots { count: stranded });
        }

        // 4. Grava
        let updated = self
            .store
            .update_config(tenant_id, &merged)
            .await?
            .ok_or(AppError::ConfigNotFound)?;

        tracing::info!(%tenant_id, "Configuração da grade atualizada");
        Ok(updated)
    }

    pub async fn delete_config(&self, tenant_id: Uuid) -> Result<TimetableConfig, AppError> {
        self.get_config(tenant_id).await?;

        if self.store.count_slots(tenant_id).await? > 0 {
            return Err(AppError::ConfigInUse);
        }

        // `None` aqui só acontece se uma aula surgiu depois da contagem
        let deleted = self
            .store
            .delete_config(tenant_id)
            .await?
            .ok_or(AppError::ConfigInUse)?;

        tracing::info!(%tenant_id, "Configuração da grade removida");
        Ok(deleted)
    }

    // =========================================================================
    //  VALIDAÇÃO DE AULAS
    // =========================================================================

    /// Roda todas as regras de uma aula candidata. Na edição, `exclude_slot_id`
    /// é a própria aula, para ela não conflitar consigo mesma.
    pub async fn validate_slot(
        &self,
        tenant_id: Uuid,
        candidate: &SlotPayload,
        exclude_slot_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        // 1. Sem configuração não há grade
        let config = self.get_config(tenant_id).await?;

        // 2-4. Período, duração e intervalos
        config.rules().check(candidate.timing())?;

        // 5. Professor já ocupado neste dia/período?
        let taken = self
            .store
            .teacher_slot_taken(
                tenant_id,
                candidate.teacher_id,
                candidate.day_of_week,
                candidate.period_number,
                exclude_slot_id,
            )
            .await?;
        if taken {
            return Err(AppError::TeacherAlreadyAssigned);
        }

        // 6. Professor leciona a matéria?
        let qualified = self
            .store
            .teacher_teaches_subject(tenant_id, candidate.teacher_id, candidate.subject_id)
            .await?;
        if !qualified {
            return Err(AppError::TeacherNotQualified);
        }

        Ok(())
    }

    // =========================================================================
    //  AULAS
    // =========================================================================

    pub async fn create_slot(&self, tenant_id: Uuid, payload: &SlotPayload) -> Result<TimetableSlot, AppError> {
        if let Err(e) = self.validate_slot(tenant_id, payload, None).await {
            tracing::debug!(%tenant_id, error = %e, "Aula recusada");
            return Err(e);
        }

        let slot = self.store.insert_slot(tenant_id, payload).await?;
        tracing::info!(
            %tenant_id,
            slot_id = %slot.id,
            day = ?slot.day_of_week,
            period = slot.period_number,
            "Aula criada"
        );
        Ok(slot)
    }

    pub async fn list_slots(&self, tenant_id: Uuid) -> Result<Vec<TimetableSlot>, AppError> {
        self.store.list_slots(tenant_id, SlotFilter::All).await
    }

    pub async fn get_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<TimetableSlot, AppError> {
        self.store
            .find_slot(tenant_id, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound(slot_id))
    }

    pub async fn update_slot(&self, tenant_id: Uuid, slot_id: Uuid, patch: &SlotPatchPayload) -> Result<TimetableSlot, AppError> {
        let current = self.get_slot(tenant_id, slot_id).await?;

        // A edição é validada por inteiro, como se fosse uma aula nova
        let candidate = current.merged_with(patch);
        candidate.validate()?;
        self.validate_slot(tenant_id, &candidate, Some(slot_id)).await?;

        let updated = self
            .store
            .update_slot(tenant_id, slot_id, &candidate)
            .await?
            .ok_or(AppError::SlotNotFound(slot_id))?;

        tracing::info!(%tenant_id, %slot_id, "Aula atualizada");
        Ok(updated)
    }

    pub async fn delete_slot(&self, tenant_id: Uuid, slot_id: Uuid) -> Result<TimetableSlot, AppError> {
        let deleted = self
            .store
            .delete_slot(tenant_id, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound(slot_id))?;

        tracing::info!(%tenant_id, %slot_id, "Aula removida");
        Ok(deleted)
    }

    pub async fn division_timetable(&self, tenant_id: Uuid, division_id: Uuid) -> Result<Vec<DaySchedule>, AppError> {
        let slots = self.store.list_slots(tenant_id, SlotFilter::Division(division_id)).await?;
        Ok(group_by_day(slots))
    }

    pub async fn teacher_timetable(&self, tenant_id: Uuid, teacher_id: Uuid) -> Result<Vec<DaySchedule>, AppError> {
        let slots = self.store.list_slots(tenant_id, SlotFilter::Teacher(teacher_id)).await?;
        Ok(group_by_day(slots))
    }
}

/// Um grupo por dia da semana, sempre os sete, cada um ordenado por período.
pub fn group_by_day(slots: Vec<TimetableSlot>) -> Vec<DaySchedule> {
    let mut days: Vec<DaySchedule> = DayOfWeek::ALL
        .iter()
        .map(|&day| DaySchedule { day, slots: Vec::new() })
        .collect();

    for slot in slots {
        // ALL segue a ordem de declaração do enum
        let index = slot.day_of_week as usize;
        days[index].slots.push(slot);
    }

    for day in &mut days {
        day.slots.sort_by_key(|slot| slot.period_number);
    }
    days
}
