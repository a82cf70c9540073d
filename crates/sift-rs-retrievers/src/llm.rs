//! Single-prompt invocation of a language model.

use crate::error::RetrieverError;
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, MessageType};
use log::debug;

/// Send `prompt` as one user message and return the response text.
/// A response without text reads as an empty string.
pub async fn invoke_model(llm: &dyn LLMProvider, prompt: &str) -> Result<String, RetrieverError> {
    let messages = [ChatMessage {
        role: ChatRole::User,
        message_type: MessageType::Text,
        content: prompt.to_string(),
    }];
    debug!("invoking language model (prompt_len={})", prompt.len());
    let response = llm
        .chat_with_tools(&messages, None, None)
        .await
        .map_err(|err| RetrieverError::Llm(err.to_string()))?;
    let text = response.text().unwrap_or_default();
    debug!("language model responded (response_len={})", text.len());
    Ok(text)
}
