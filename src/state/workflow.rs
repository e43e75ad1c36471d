/// Edit workflow state machine
///
/// This struct owns the five observable pieces of state (image, prompt,
/// result, loading flag, error message) and applies every transition
/// through a single reducer, `Workflow::apply`. The reducer never performs
/// I/O; work that must happen outside the state (the actual edit request)
/// is returned to the caller as an `Effect`.

use crate::service::{EditRequest, EditedImage};
use crate::state::data::{ResultImage, SelectedImage, Status};
use crate::upload::UploadError;

/// The editorial instruction the prompt field starts out with.
pub const DEFAULT_PROMPT: &str = "Make the colors more vibrant and add a warm sunset glow";

/// Everything the edit workflow knows.
#[derive(Debug, Clone)]
pub struct Workflow {
    /// The uploaded image, if any
    pub image: Option<SelectedImage>,
    /// Current prompt text, freely editable
    pub prompt: String,
    /// The last successful edit, cleared by uploads and new requests
    pub result: Option<ResultImage>,
    /// Idle / Loading / Error
    pub status: Status,
    /// Bumped on every accepted upload; stale completions are recognized
    /// by carrying an older value
    generation: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            image: None,
            prompt: DEFAULT_PROMPT.to_string(),
            result: None,
            status: Status::Idle,
            generation: 0,
        }
    }
}

/// Inputs to the reducer.
#[derive(Debug, Clone)]
pub enum Event {
    /// A new upload finished encoding successfully
    ImageUploaded(SelectedImage),
    /// The upload was rejected or could not be read
    UploadFailed(UploadError),
    /// The user edited the prompt text
    PromptChanged(String),
    /// The user pressed Generate
    GenerateRequested,
    /// The in-flight edit request resolved
    EditFinished {
        generation: u64,
        outcome: Result<EditedImage, String>,
    },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send this request to the edit service and feed the outcome back
    /// as `Event::EditFinished` with the same generation
    RequestEdit { request: EditRequest, generation: u64 },
}

impl Workflow {
    /// Apply one event and return the effect it demands.
    ///
    /// All five state fields are updated here and nowhere else.
    pub fn apply(&mut self, event: Event) -> Effect {
        match event {
            Event::ImageUploaded(image) => {
                // A fresh upload invalidates any prior result and error,
                // and supersedes whatever request may still be in flight.
                self.image = Some(image);
                self.result = None;
                self.status = Status::Idle;
                self.generation += 1;
                Effect::None
            }
            Event::UploadFailed(error) => {
                self.enter_error(error.to_string());
                Effect::None
            }
            Event::PromptChanged(prompt) => {
                self.prompt = prompt;
                Effect::None
            }
            Event::GenerateRequested => self.generate(),
            Event::EditFinished {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    // A newer upload superseded this request; ignore it.
                    return Effect::None;
                }
                match outcome {
                    Ok(edited) => {
                        let Some(image) = &self.image else {
                            return Effect::None;
                        };
                        let media_type = image.media_type.clone();
                        self.result =
                            Some(ResultImage::new(&media_type, &edited.payload, edited.bytes));
                        self.status = Status::Idle;
                    }
                    Err(message) => self.enter_error(message),
                }
                Effect::None
            }
        }
    }

    /// Whether the Generate control should be enabled.
    pub fn can_generate(&self) -> bool {
        self.image.is_some() && !self.status.is_loading()
    }

    /// Current upload generation; completions carrying an older value
    /// are stale and will be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validate preconditions and, if they hold, enter Loading and demand
    /// the edit request. No network work happens before both checks pass.
    fn generate(&mut self) -> Effect {
        // At most one outstanding request; the UI disables the control
        // while Loading, this guard covers everything else.
        if self.status.is_loading() {
            return Effect::None;
        }
        let Some(image) = self.image.as_ref() else {
            self.enter_error("Please upload an image first.".to_string());
            return Effect::None;
        };
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            self.enter_error("Please enter an editing prompt.".to_string());
            return Effect::None;
        }

        let request = EditRequest {
            image_base64: image.payload.clone(),
            media_type: image.media_type.clone(),
            prompt: prompt.to_string(),
        };
        self.result = None;
        self.status = Status::Loading;
        Effect::RequestEdit {
            request,
            generation: self.generation,
        }
    }

    fn enter_error(&mut self, message: String) {
        self.result = None;
        self.status = Status::Error(message);
    }
}
