//! `get_php_exercises` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `get_php_exercises` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPhpExercisesParams {
    #[serde(alias = "user_msg")]
    #[schemars(description = "Mensagem do usuário contendo a sua dúvida.")]
    pub user_message: String,
}

pub const DESCRIPTION: &str = "Busca exercícios de PHP relacionados à dúvida do usuário, \
    caso seja uma dúvida sobre desenvolvimento de sistemas com PHP. Retorna os exercícios encontrados.";
