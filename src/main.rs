use iced::widget::image as picture;
use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

// Declare the application modules
mod service;
mod state;
mod upload;

use service::{EditClient, EditedImage};
use state::data::SelectedImage;
use state::workflow::{Effect, Event, Workflow};
use upload::UploadError;

/// Main application state
struct PromptEditor {
    /// The edit workflow state machine
    workflow: Workflow,
    /// Client for the remote edit service
    client: EditClient,
    /// Cached preview of the uploaded image
    original_preview: Option<picture::Handle>,
    /// Cached preview of the edited result
    result_preview: Option<picture::Handle>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Upload Image" button
    PickImage,
    /// Background read/encode of the picked file completed
    ImageLoaded(Result<SelectedImage, UploadError>),
    /// User edited the prompt text
    PromptChanged(String),
    /// User clicked the "Generate Edit" button
    Generate,
    /// The edit request resolved
    EditFinished {
        generation: u64,
        outcome: Result<EditedImage, String>,
    },
    /// User clicked the "Save Result" button
    SaveResult,
    /// Background save of the result completed
    SaveFinished(Result<PathBuf, String>),
}

impl PromptEditor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let client = EditClient::from_env();

        println!("🎨 Prompt Editor initialized (model: {})", client.model());

        (
            PromptEditor {
                workflow: Workflow::default(),
                client,
                original_preview: None,
                result_preview: None,
                status: String::from("Ready. Upload an image to begin."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker, filtered to image types
                let file = FileDialog::new()
                    .set_title("Select an Image to Edit")
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp"])
                    .pick_file();

                match file {
                    Some(path) => match upload::media_type_for(&path) {
                        Some(_) => Task::perform(upload::read_image(path), Message::ImageLoaded),
                        // The picker filter is advisory; the type check is not
                        None => self.dispatch(Event::UploadFailed(UploadError::NotAnImage)),
                    },
                    None => Task::none(),
                }
            }
            Message::ImageLoaded(Ok(image)) => {
                println!(
                    "🖼️  Loaded {} ({} bytes)",
                    image.path.display(),
                    image.bytes.len()
                );

                self.status = format!("Loaded {}.", image.filename);
                self.original_preview = Some(picture::Handle::from_bytes(image.bytes.clone()));
                self.result_preview = None;

                self.dispatch(Event::ImageUploaded(image))
            }
            Message::ImageLoaded(Err(error)) => {
                eprintln!("⚠️  Upload failed: {error}");
                self.dispatch(Event::UploadFailed(error))
            }
            Message::PromptChanged(prompt) => self.dispatch(Event::PromptChanged(prompt)),
            Message::Generate => self.dispatch(Event::GenerateRequested),
            Message::EditFinished {
                generation,
                outcome,
            } => {
                if let Err(error) = &outcome {
                    eprintln!("⚠️  Edit failed: {error}");
                }

                let fresh = generation == self.workflow.generation();
                let task = self.dispatch(Event::EditFinished {
                    generation,
                    outcome,
                });

                // Mirror whatever result survived the transition; a stale
                // completion changes nothing
                if fresh {
                    self.result_preview = self
                        .workflow
                        .result
                        .as_ref()
                        .map(|result| picture::Handle::from_bytes(result.bytes.clone()));

                    if let Some(result) = &self.workflow.result {
                        println!(
                            "✨ Edit ready ({} bytes, {} char data URI)",
                            result.bytes.len(),
                            result.data_uri.len()
                        );
                        self.status = String::from("Edit complete.");
                    }
                }

                task
            }
            Message::SaveResult => {
                let Some(result) = &self.workflow.result else {
                    return Task::none();
                };

                let file = FileDialog::new()
                    .set_title("Save Edited Image")
                    .set_file_name("edited.png")
                    .save_file();

                match file {
                    Some(path) => {
                        let bytes = result.bytes.clone();
                        Task::perform(
                            async move {
                                tokio::fs::write(&path, bytes)
                                    .await
                                    .map(|()| path)
                                    .map_err(|error| error.to_string())
                            },
                            Message::SaveFinished,
                        )
                    }
                    None => Task::none(),
                }
            }
            Message::SaveFinished(Ok(path)) => {
                println!("💾 Saved edited image to {}", path.display());
                self.status = format!("✅ Saved edited image to {}", path.display());
                Task::none()
            }
            Message::SaveFinished(Err(error)) => {
                eprintln!("⚠️  Save failed: {error}");
                self.status = format!("Save failed: {error}");
                Task::none()
            }
        }
    }

    /// Feed one event through the workflow reducer and run its effect
    fn dispatch(&mut self, event: Event) -> Task<Message> {
        match self.workflow.apply(event) {
            Effect::None => Task::none(),
            Effect::RequestEdit {
                request,
                generation,
            } => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.edit(request).await.map_err(|error| error.to_string()) },
                    move |outcome| Message::EditFinished {
                        generation,
                        outcome,
                    },
                )
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let upload_hint = match &self.workflow.image {
            Some(image) => image.filename.as_str(),
            None => "No image selected",
        };

        let generate_label = if self.workflow.status.is_loading() {
            "Generating…"
        } else {
            "Generate Edit"
        };

        let mut content: Column<Message> = column![
            text("Prompt Editor").size(40),
            row![
                button("Upload Image")
                    .on_press(Message::PickImage)
                    .padding(10),
                text(upload_hint).size(16),
            ]
            .spacing(20)
            .align_y(Alignment::Center),
            text_input("Describe the edit you want…", &self.workflow.prompt)
                .on_input(Message::PromptChanged)
                .padding(10),
            row![
                button(generate_label)
                    .on_press_maybe(self.workflow.can_generate().then_some(Message::Generate))
                    .padding(10),
                button("Save Result")
                    .on_press_maybe(self.workflow.result.is_some().then_some(Message::SaveResult))
                    .padding(10),
            ]
            .spacing(20),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        // The single alert region for all workflow errors
        if let Some(message) = self.workflow.status.error() {
            content = content.push(text(message).size(16).style(text::danger));
        }

        let mut previews = row![].spacing(20);
        if let Some(handle) = &self.original_preview {
            previews = previews.push(
                column![text("Original").size(14), picture(handle.clone())]
                    .spacing(8)
                    .width(Length::FillPortion(1))
                    .align_x(Alignment::Center),
            );
        }
        if self.workflow.status.is_loading() {
            // The result slot never shows a stale image while loading
            previews = previews.push(
                column![text("Edited").size(14), text("Generating…").size(16)]
                    .spacing(8)
                    .width(Length::FillPortion(1))
                    .align_x(Alignment::Center),
            );
        } else if let Some(handle) = &self.result_preview {
            previews = previews.push(
                column![text("Edited").size(14), picture(handle.clone())]
                    .spacing(8)
                    .width(Length::FillPortion(1))
                    .align_x(Alignment::Center),
            );
        }
        content = content.push(previews);

        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application(
        "Prompt Editor",
        PromptEditor::update,
        PromptEditor::view,
    )
    .theme(PromptEditor::theme)
    .centered()
    .run_with(PromptEditor::new)
}
