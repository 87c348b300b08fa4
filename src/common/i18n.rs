// src/common/i18n.rs

use std::collections::HashMap;

/// Idioma usado quando o cliente não pede nenhum que conhecemos.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Idiomas com catálogo próprio.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "pt"];

const EN: &[(&str, &str)] = &[
    ("validation.failed", "One or more fields are invalid."),
    ("auth.invalid_token", "Invalid or missing authentication token."),
    ("auth.role_required", "This action requires the {role} role."),
    ("tenancy.missing", "No tenant context"),
    ("tenancy.not_found", "Tenant not found"),
    ("timetable.config_exists", "Timetable configuration already exists for this tenant"),
    ("timetable.config_not_found", "Timetable configuration not found"),
    ("timetable.config_in_use", "Cannot delete config while timetable slots exist"),
    ("timetable.config_strands_slots", "{count} existing timetable slot(s) do not fit the new configuration"),
    ("timetable.slot_not_found", "Timetable slot with ID {id} not found"),
    ("timetable.period_out_of_range", "Period number cannot exceed {max}"),
    ("timetable.duration_mismatch", "Period duration must be {expected} minutes"),
    ("timetable.break_overlap", "Time slot overlaps with break time ({name})"),
    ("timetable.teacher_busy", "Teacher is already assigned to another class at this time"),
    ("timetable.teacher_not_qualified", "Teacher is not assigned to teach this subject"),
    ("timetable.reference_not_found", "Division, subject or teacher not found for this tenant"),
    ("timetable.invalid_clock", "Invalid time '{value}', expected HH:MM"),
    ("internal", "An unexpected error occurred."),
];

const PT: &[(&str, &str)] = &[
    ("validation.failed", "Um ou mais campos são inválidos."),
    ("auth.invalid_token", "Token de autenticação inválido ou ausente."),
    ("auth.role_required", "Esta ação exige o cargo {role}."),
    ("tenancy.missing", "Nenhuma escola associada ao usuário."),
    ("tenancy.not_found", "Escola não encontrada."),
    ("timetable.config_exists", "A configuração da grade já existe para esta escola."),
    ("timetable.config_not_found", "Configuração da grade não encontrada."),
    ("timetable.config_in_use", "Não é possível excluir a configuração enquanto houver aulas na grade."),
    ("timetable.config_strands_slots", "{count} aula(s) existente(s) não se encaixam na nova configuração."),
    ("timetable.slot_not_found", "Aula com ID {id} não encontrada."),
    ("timetable.period_out_of_range", "O número do período não pode passar de {max}."),
    ("timetable.duration_mismatch", "A duração do período deve ser de {expected} minutos."),
    ("timetable.break_overlap", "O horário coincide com o intervalo ({name})."),
    ("timetable.teacher_busy", "O professor já está em outra turma neste horário."),
    ("timetable.teacher_not_qualified", "O professor não leciona esta matéria."),
    ("timetable.reference_not_found", "Turma, matéria ou professor não encontrado nesta escola."),
    ("timetable.invalid_clock", "Horário inválido '{value}', use HH:MM."),
    ("internal", "Ocorreu um erro inesperado."),
];

/// Catálogo de mensagens por idioma.
#[derive(Debug)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs }
    }

    /// Traduz `key` para `lang`, trocando `{nome}` pelos argumentos.
    /// Idioma ou chave desconhecidos caem no inglês; chave inexistente volta ela mesma.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key))
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|catalog| catalog.get(key)).copied()
    }
}
