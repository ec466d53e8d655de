use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
	User,
	Assistant,
}
impl ChatRole {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"user" => Some(Self::User),
			"assistant" => Some(Self::Assistant),
			_ => None,
		}
	}
}
impl Display for ChatRole {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One prior message of a conversation, oldest first when listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
	pub role: ChatRole,
	pub content: String,
}
impl ChatTurn {
	pub fn user(content: impl Into<String>) -> Self {
		Self { role: ChatRole::User, content: content.into() }
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self { role: ChatRole::Assistant, content: content.into() }
	}
}
