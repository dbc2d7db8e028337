//! `send_message` tool: ask the user something mid-turn.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `send_message` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendMessageParams {
    #[schemars(description = "A mensagem a ser enviada ao usuário.")]
    pub message: String,
}

pub const DESCRIPTION: &str = "Envia uma mensagem ao usuário e espera a resposta dele. \
    Retorna a resposta do usuário.";

/// Reminders appended to every user message handed to the agent.
pub const SYSTEM_REMINDERS: &str = "\n(Aviso 1 do Sistema: caso essa mensagem seja uma dúvida, \
    explique em seus pensamentos qual o nível do usuário e seu formato de aprendizado preferido.)\n\
    (Aviso 2 do Sistema: caso essa mensagem seja uma dúvida, utilize a ferramenta de obtenção de \
    conteúdo para basear sua resposta.)";

pub fn with_reminders(user_message: &str) -> String {
    format!("{user_message}{SYSTEM_REMINDERS}")
}
