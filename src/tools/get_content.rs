//! `get_content` tool: grounded teaching material in the learner's format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::index::types::{ContentClass, ScoredChunk};

/// Learning format preferred by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    #[serde(alias = "texto")]
    Text,
    #[serde(alias = "vídeo")]
    Video,
    #[serde(alias = "imagem")]
    Image,
}

impl ContentFormat {
    pub fn class(self) -> ContentClass {
        match self {
            ContentFormat::Text => ContentClass::Text,
            ContentFormat::Video => ContentClass::Video,
            ContentFormat::Image => ContentClass::Image,
        }
    }
}

/// Parameters for the `get_content` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetContentParams {
    /// The user's question, used as the search query.
    #[serde(alias = "user_msg")]
    #[schemars(description = "Mensagem do usuário contendo a sua dúvida.")]
    pub user_message: String,

    /// Defaults to text when the user stated no preference.
    #[serde(default, alias = "content_format")]
    #[schemars(
        description = "Formato de conteúdo preferido pelo usuário: 'text', 'video' ou 'image'. Use 'text' se o usuário não disse nada."
    )]
    pub format: ContentFormat,
}

pub const DESCRIPTION: &str = "Busca conteúdo sobre a dúvida do usuário no formato preferido por ele. \
    Não gera respostas nem adapta o conteúdo ao nível do usuário: isso é responsabilidade sua. \
    Buscar o mesmo assunto novamente pedindo outro nível não traz resultados diferentes.";

const ADAPT_HEADER: &str = "Adapte o seguinte conteúdo ao nível do usuário \
    (veja se é iniciante, intermediário ou avançado):";

const ADAPT_RULES: &str = "Você deve utilizar esse conteúdo apenas como base, você deve criar a \
    resposta com suas palavras e adaptando ao nível do usuário. Restrinja-se em apenas responder o \
    que o usuário perguntou, não forneça informações que fuja de sua dúvida.";

const IMAGE_LINK_RULE: &str = "Além disso, envie para o usuário o link da imagem que irá auxiliar \
    na dúvida dele. Você é proibido de responder sem enviar o link.";

const VIDEO_LINK_RULE: &str = "Além disso, envie para o usuário o link do vídeo que irá auxiliar \
    na dúvida dele. Você é proibido de responder sem enviar o link.";

/// Wrap retrieved chunks in the paraphrase-and-adapt directive.
///
/// Image chunks each carry the infographic link; video chunks already embed
/// their timestamped links from data preparation.
pub fn directive(format: ContentFormat, chunks: &[ScoredChunk], image_url: &str) -> String {
    let mut out = String::from(ADAPT_HEADER);
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!("\n[{}] {}", i + 1, chunk.content));
        if format == ContentFormat::Image {
            out.push_str(&format!(
                "\n(Este é o link para acessar a imagem a qual o texto se refere {image_url})"
            ));
        }
    }
    out.push('\n');
    out.push_str(ADAPT_RULES);

    match format {
        ContentFormat::Text => {}
        ContentFormat::Image => {
            out.push(' ');
            out.push_str(IMAGE_LINK_RULE);
        }
        ContentFormat::Video => {
            out.push(' ');
            out.push_str(VIDEO_LINK_RULE);
        }
    }
    out
}
