//! The tabular column contract.
//!
//! Column headers are the cross-component contract with the spreadsheets the
//! academy exports, so they are pinned here verbatim (Portuguese, exact
//! casing) and referenced everywhere else by constant.

// ---- class table -----------------------------------------------------------

pub const GROUP: &str = "nome grupo";
pub const WEEKDAYS: &str = "dias da semana";
pub const TIME: &str = "horario";
pub const UNIT: &str = "unidade";
pub const STATUS: &str = "status";
pub const MODALITY: &str = "modalidade";
pub const CATEGORY: &str = "grupo";
pub const STAGE: &str = "stage";
pub const WEEKLY_SESSIONS: &str = "n aulas";
pub const TEACHER: &str = "teacher";
pub const LAST_TEACHER: &str = "ultimo_professor";
pub const PREVIOUS_TEACHER: &str = "penultimo_professor";
pub const EXCLUDED_TEACHERS: &str = "professores_excluidos";

// ---- teacher table ---------------------------------------------------------

pub const TEACHER_ID: &str = "TEACHER";
pub const TARGET_LOAD: &str = "MEDIA";
pub const ONLINE: &str = "ONLINE";
pub const PRESENCIAL: &str = "PRESENCIAL";
pub const INTENSIVE: &str = "INTENSIVO";

// ---- assignment output -----------------------------------------------------

pub const ASSIGNED_TEACHER: &str = "professores_alocados";
