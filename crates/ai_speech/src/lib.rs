//! AI Speech - Speech-to-Text and Text-to-Speech providers
//!
//! Implements the application layer's speech ports against an
//! OpenAI-compatible audio API: Whisper-style transcription for guest
//! voice messages and TTS synthesis for voice replies.
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{OpenAiSpeechProvider, SpeechConfig};
//! use application::{SpeechToTextPort, TextToSpeechPort};
//!
//! let provider = OpenAiSpeechProvider::new(config)?;
//!
//! // Transcribe a guest voice note
//! let text = provider.transcribe("https://cdn.example.com/note.ogg").await?;
//!
//! // Synthesize a voice reply
//! let audio = provider.synthesize("Your room is ready!").await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use provider::OpenAiSpeechProvider;
