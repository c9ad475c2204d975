//! Outbound prompt assembly.

use chrono::{DateTime, Utc};

use crate::message::{Message, Role};

/// Built-in instructions for the tax assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful and knowledgeable tax assistant AI. Your role is to help users understand their tax obligations and guide them through the tax filing process.

Key responsibilities:
1. Ask clarifying questions to understand the user's tax situation
2. Help users identify their tax bracket based on their income
3. Explain what income and expenses are taxable or deductible
4. Guide users through common tax scenarios (employment income, self-employment, investments, etc.)
5. Provide information about tax credits and deductions they may be eligible for
6. Help users understand tax deadlines and filing requirements

Important guidelines:
- Always be clear that you're providing general information, not professional tax advice
- Ask one or two questions at a time to avoid overwhelming the user
- Use simple, jargon-free language when possible
- If uncertain about specific tax laws, acknowledge limitations
- Encourage users to consult with a tax professional for complex situations
- Be patient and supportive, as taxes can be stressful

Start by greeting the user warmly and asking about their tax situation to better assist them.";

/// Builds the message sequence sent to the model.
///
/// The system prompt is prepended to every request and is never part of a
/// stored transcript.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system: Message,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptAssembler {
    /// Create an assembler with the given system prompt.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system: Message::new(Role::System, system_prompt),
        }
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.system.content()
    }

    /// `[system] + transcript + [user(new_user_text)]`, stamped now.
    #[must_use]
    pub fn build(&self, transcript: &[Message], new_user_text: &str) -> Vec<Message> {
        self.build_at(transcript, new_user_text, Utc::now())
    }

    /// Same as [`build`](Self::build) with an explicit timestamp for the new
    /// user message.
    #[must_use]
    pub fn build_at(
        &self,
        transcript: &[Message],
        new_user_text: &str,
        now: DateTime<Utc>,
    ) -> Vec<Message> {
        let mut out = Vec::with_capacity(transcript.len() + 2);
        out.push(self.system.clone());
        out.extend_from_slice(transcript);
        out.push(Message::at(Role::User, new_user_text, now));
        out
    }
}
