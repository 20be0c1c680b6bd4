use iced::keyboard::{self, key, Key};
use iced::widget::image::FilterMethod;
use iced::widget::{button, column, container, row, text, text_editor, Column};
use iced::{window, Alignment, ContentFit, Element, Length, Size, Subscription, Task, Theme};
use log::{error, info, warn};
use rfd::FileDialog;
use std::path::PathBuf;

mod color;
mod config;
mod error;
mod preview;
mod state;
mod ui;

use preview::Preview;
use state::{BrowserState, ClassSet, Phase};

/// What the main area is showing
enum Mode {
    Browsing,
    /// Free-text class editor, one class per line
    EditingClasses(text_editor::Content),
}

/// Main application state
struct Labeler {
    browser: BrowserState,
    /// Decoded image for the current cursor position
    preview: Option<Preview>,
    mode: Mode,
    /// Starting point for the next folder picker
    last_directory: Option<PathBuf>,
    /// Outcome of the last action, shown under the toolbar
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    OpenDirectory,
    Previous,
    Next,
    Classify(String),
    EditClasses,
    ClassEditorAction(text_editor::Action),
    ApplyClasses,
    CancelClassEdit,
    LoadSubdirectories,
    Autoskip,
    /// Background decode finished for the given path
    PreviewLoaded(PathBuf, Result<Preview, String>),
}

impl Labeler {
    fn new() -> (Self, Task<Message>) {
        let labeler = Labeler {
            browser: BrowserState::default(),
            preview: None,
            mode: Mode::Browsing,
            last_directory: dirs::home_dir(),
            status: String::from("Open a directory to start labeling."),
        };
        (labeler, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenDirectory => {
                let mut dialog = FileDialog::new().set_title("Select Image Directory");
                if let Some(dir) = &self.last_directory {
                    dialog = dialog.set_directory(dir);
                }
                let Some(directory) = dialog.pick_folder() else {
                    return Task::none();
                };

                match BrowserState::open(&directory, self.browser.classes().clone()) {
                    Ok(browser) => {
                        self.browser = browser;
                        self.mode = Mode::Browsing;
                        self.last_directory = Some(directory.clone());
                        self.status = format!(
                            "Opened {} ({} images).",
                            directory.display(),
                            self.browser.len()
                        );
                        self.report_warnings();
                        self.refresh_preview()
                    }
                    Err(e) => {
                        error!("Failed to open {}: {}", directory.display(), e);
                        self.status = format!("Could not open directory: {}", e);
                        Task::none()
                    }
                }
            }
            Message::Previous => self.step(-1),
            Message::Next => self.step(1),
            Message::Classify(class_name) => match self.browser.classify(&class_name) {
                Ok(Some(outcome)) => {
                    self.status = if outcome.already_filed() {
                        format!("Kept {} in {}.", outcome.from.display(), outcome.class_name)
                    } else {
                        format!("Moved to {}.", outcome.to.display())
                    };
                    self.refresh_preview()
                }
                Ok(None) => Task::none(),
                Err(e) => {
                    self.status = format!("Could not classify: {}", e);
                    Task::none()
                }
            },
            Message::EditClasses => {
                let text = self.browser.classes().to_text();
                self.mode = Mode::EditingClasses(text_editor::Content::with_text(&text));
                Task::none()
            }
            Message::ClassEditorAction(action) => {
                if let Mode::EditingClasses(content) = &mut self.mode {
                    content.perform(action);
                }
                Task::none()
            }
            Message::ApplyClasses => {
                if let Mode::EditingClasses(content) = &self.mode {
                    let classes = ClassSet::from_text(&content.text());
                    let rebuilt = self.browser.set_classes(classes.iter());
                    self.status = if !rebuilt {
                        String::from("Classes unchanged.")
                    } else if classes.is_empty() {
                        String::from("No classes defined; add some to classify.")
                    } else {
                        format!("{} classes.", classes.len())
                    };
                }
                self.mode = Mode::Browsing;
                Task::none()
            }
            Message::CancelClassEdit => {
                self.mode = Mode::Browsing;
                Task::none()
            }
            Message::LoadSubdirectories => match self.browser.load_subdirectories() {
                Ok(added) => {
                    self.status = format!("Added {} images from subdirectories.", added);
                    self.report_warnings();
                    self.refresh_preview()
                }
                Err(e) => {
                    self.status = format!("Could not load subdirectories: {}", e);
                    Task::none()
                }
            },
            Message::Autoskip => {
                let removed = self.browser.autoskip();
                self.status = format!(
                    "Skipped {} already-correct images, {} left.",
                    removed,
                    self.browser.len()
                );
                self.refresh_preview()
            }
            Message::PreviewLoaded(path, result) => {
                if self.browser.current().map(|image| image.path()) != Some(path.as_path()) {
                    return Task::none();
                }
                match result {
                    Ok(preview) => self.preview = Some(preview),
                    Err(e) => {
                        warn!("{}", e);
                        self.preview = None;
                        self.status = e;
                    }
                }
                Task::none()
            }
        }
    }

    fn step(&mut self, delta: isize) -> Task<Message> {
        if self.browser.is_empty() || matches!(self.mode, Mode::EditingClasses(_)) {
            return Task::none();
        }
        self.browser.move_cursor(delta);
        self.refresh_preview()
    }

    /// Start decoding the image under the cursor
    fn refresh_preview(&mut self) -> Task<Message> {
        let Some(path) = self.browser.current().map(|image| image.path().to_path_buf()) else {
            self.preview = None;
            return Task::none();
        };
        if self.preview.as_ref().map(|p| &p.path) == Some(&path) {
            return Task::none();
        }

        let requested = path.clone();
        Task::perform(preview::load_preview(path), move |result| {
            Message::PreviewLoaded(requested.clone(), result.map_err(|e| e.to_string()))
        })
    }

    /// Append recovered sidecar problems to the status line
    fn report_warnings(&mut self) {
        for warning in self.browser.take_warnings() {
            self.status.push_str(&format!(" Warning: {}.", warning));
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            button("Open Directory").on_press(Message::OpenDirectory),
            button("Load Subdirectories").on_press_maybe(
                (self.browser.working_dir().is_some() && !self.browser.subdirectories_loaded())
                    .then_some(Message::LoadSubdirectories)
            ),
            button("Edit Classes").on_press(Message::EditClasses),
            button("Skip Correct")
                .on_press_maybe(self.browser.has_autolabels().then_some(Message::Autoskip)),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let position = match self.browser.phase() {
            Phase::Empty => String::from("No images"),
            Phase::Browsing => {
                let filename = self
                    .browser
                    .current()
                    .map(|image| image.filename())
                    .unwrap_or_default();
                let current = self.browser.current().map(|image| image.path());
                let size = match &self.preview {
                    Some(p) if current == Some(p.path.as_path()) => {
                        format!("  ({}x{})", p.width, p.height)
                    }
                    _ => String::new(),
                };
                format!(
                    "{} / {}  {}{}",
                    self.browser.cursor() + 1,
                    self.browser.len(),
                    filename,
                    size
                )
            }
        };

        let main_area: Element<Message> = match &self.mode {
            Mode::Browsing => self.browse_view(),
            Mode::EditingClasses(content) => Self::class_editor(content),
        };

        let content: Column<Message> = column![
            toolbar,
            text(&self.status).size(14),
            text(position).size(14),
            main_area,
        ]
        .spacing(10)
        .padding(10)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn browse_view(&self) -> Element<Message> {
        let picture: Element<Message> = match &self.preview {
            Some(preview) => iced::widget::image(preview.handle.clone())
                .content_fit(ContentFit::Contain)
                .filter_method(FilterMethod::Nearest)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("No image").into(),
        };

        let frame = container(picture)
            .padding(config::IMAGE_PADDING)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill);

        let has_image = self.browser.phase() == Phase::Browsing;
        let viewer = row![
            button(text("<").center())
                .on_press_maybe(has_image.then_some(Message::Previous))
                .height(Length::Fill),
            frame,
            button(text(">").center())
                .on_press_maybe(has_image.then_some(Message::Next))
                .height(Length::Fill),
        ]
        .height(Length::Fill);

        column![
            viewer,
            ui::class_buttons(self.browser.classes(), self.browser.confidences(), has_image),
        ]
        .spacing(10)
        .into()
    }

    fn class_editor(content: &text_editor::Content) -> Element<Message> {
        column![
            text("One class per line. Blank lines and duplicates are ignored."),
            text_editor(content)
                .on_action(Message::ClassEditorAction)
                .height(Length::Fill),
            row![
                button("Apply").on_press(Message::ApplyClasses),
                button("Cancel").on_press(Message::CancelClassEdit),
            ]
            .spacing(10),
        ]
        .spacing(10)
        .height(Length::Fill)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            Key::Named(key::Named::ArrowLeft) => Some(Message::Previous),
            Key::Named(key::Named::ArrowRight) => Some(Message::Next),
            _ => None,
        })
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting class labeler");

    let (min_width, min_height) = config::MIN_WINDOW_SIZE;

    iced::application(
        "Minimalist Classification Labeler",
        Labeler::update,
        Labeler::view,
    )
    .subscription(Labeler::subscription)
    .theme(Labeler::theme)
    .window(window::Settings {
        min_size: Some(Size::new(min_width, min_height)),
        ..window::Settings::default()
    })
    .centered()
    .run_with(Labeler::new)
}
