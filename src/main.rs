use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iced::event::{self, Event};
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, progress_bar, row, scrollable,
    text, Column, Stack,
};
use iced::{window, Alignment, Color, Element, Length, Subscription, Task, Theme};
use tracing::{debug, error, info, warn};

mod config;
mod logging;
mod metrics;
mod net;
mod state;
mod ui;

use config::AppConfig;
use metrics::MetricsSeries;
use net::HttpClient;
use state::analysis::{self, AnalysisError, AnalysisEvent, AnalysisState, STAGE_LABELS};
use state::data::ImageBlob;
use state::health::{self, HealthMonitor, ProbeTicket};
use state::selection::{self, AcquisitionError, DropBatch, ImageSlot};
use ui::line_chart::{self, ACCURACY_LINES, LEARNING_RATE_LINES, LOSS_LINES};
use ui::notice::{self, Notice};
use ui::result_card::{self, ResultView};

/// Time to let every file of one drop gesture arrive
const DROP_SETTLE: Duration = Duration::from_millis(50);

/// Training metrics panel
#[derive(Debug, Clone)]
enum MetricsView {
    Loading,
    Ready(Arc<MetricsSeries>),
    Failed(String),
}

/// Main application state
struct Dashboard {
    config: AppConfig,
    client: Arc<HttpClient>,
    /// The active image and its preview
    slot: ImageSlot,
    analysis: AnalysisState,
    /// Card of the last completed analysis
    result_card: Option<ResultView>,
    health: HealthMonitor,
    metrics: MetricsView,
    drops: DropBatch,
    /// Files are hovering over the window
    drag_active: bool,
    samples_open: bool,
    /// Sample currently being fetched
    sample_loading: Option<String>,
    zoomed: bool,
    notice: Option<Notice>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose File"
    PickFile,
    /// Native picker closed (Ok(None) when cancelled)
    FilePicked(Result<Option<ImageBlob>, Arc<AcquisitionError>>),
    ShowSamples,
    HideSamples,
    SampleChosen(String),
    SampleLoaded(Result<ImageBlob, Arc<AcquisitionError>>),
    FileHovered,
    FilesHoveredLeft,
    FileDropped(PathBuf),
    /// All files of the current drop gesture have arrived
    DropSettled,
    DropLoaded(Result<ImageBlob, Arc<AcquisitionError>>),
    ToggleZoom,
    Analyze,
    Analysis(AnalysisEvent),
    ResetAnalysis,
    HealthTick,
    HealthChecked(ProbeTicket, bool),
    LoadMetrics,
    MetricsLoaded(Result<Arc<MetricsSeries>, String>),
    DismissNotice,
}

impl Dashboard {
    fn new(config: AppConfig, client: Arc<HttpClient>) -> (Self, Task<Message>) {
        info!(
            "🫁 PulmoScan starting (inference: {}, assets: {})",
            config.inference_url, config.asset_url
        );

        (
            Dashboard {
                config,
                client,
                slot: ImageSlot::new(),
                analysis: AnalysisState::Idle,
                result_card: None,
                health: HealthMonitor::new(),
                metrics: MetricsView::Loading,
                drops: DropBatch::default(),
                drag_active: false,
                samples_open: false,
                sample_loading: None,
                zoomed: false,
                notice: None,
            },
            Task::done(Message::LoadMetrics),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile => Task::perform(selection::pick_image(), |result| {
                Message::FilePicked(result.map_err(Arc::new))
            }),
            Message::FilePicked(Ok(Some(blob))) => {
                self.select(blob);
                Task::none()
            }
            Message::FilePicked(Ok(None)) => Task::none(),
            Message::FilePicked(Err(err)) => {
                warn!("⚠️  {}", err);
                self.notice = Some(Notice::failure(err.to_string()));
                Task::none()
            }
            Message::ShowSamples => {
                self.samples_open = true;
                Task::none()
            }
            Message::HideSamples => {
                self.samples_open = false;
                Task::none()
            }
            Message::SampleChosen(name) => {
                if self.sample_loading.is_some() {
                    return Task::none();
                }
                self.sample_loading = Some(name.clone());
                Task::perform(
                    selection::fetch_sample(Arc::clone(&self.client), name),
                    |result| Message::SampleLoaded(result.map_err(Arc::new)),
                )
            }
            Message::SampleLoaded(result) => {
                self.sample_loading = None;
                match result {
                    Ok(blob) => {
                        self.select(blob);
                        self.samples_open = false;
                    }
                    Err(err) => {
                        warn!("⚠️  {}", err);
                        self.notice = Some(Notice::failure("Failed to load sample image"));
                    }
                }
                Task::none()
            }
            Message::FileHovered => {
                self.drag_active = true;
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.drag_active = false;
                Task::none()
            }
            Message::FileDropped(path) => {
                self.drag_active = false;
                if self.drops.push(path) {
                    Task::perform(tokio::time::sleep(DROP_SETTLE), |_| Message::DropSettled)
                } else {
                    Task::none()
                }
            }
            Message::DropSettled => {
                let paths = self.drops.take();
                match selection::accept_drop(&paths) {
                    Some((path, media_type)) => Task::perform(
                        selection::read_dropped(path.to_path_buf(), media_type),
                        |result| Message::DropLoaded(result.map_err(Arc::new)),
                    ),
                    None => Task::none(),
                }
            }
            Message::DropLoaded(Ok(blob)) => {
                self.select(blob);
                Task::none()
            }
            Message::DropLoaded(Err(err)) => {
                warn!("⚠️  {}", err);
                self.notice = Some(Notice::failure(err.to_string()));
                Task::none()
            }
            Message::ToggleZoom => {
                self.zoomed = !self.zoomed && self.slot.preview().is_some();
                Task::none()
            }
            Message::Analyze => match self.analysis.begin(self.slot.active()) {
                Ok(blob) => {
                    self.result_card = None;
                    self.notice = None;
                    info!("🔬 Analyzing {}", blob.name);
                    Task::run(
                        analysis::run(Arc::clone(&self.client), blob, self.config.stage_dwell()),
                        Message::Analysis,
                    )
                }
                Err(AnalysisError::NoImage) => {
                    self.notice = Some(Notice::validation(AnalysisError::NoImage.to_string()));
                    Task::none()
                }
                Err(AnalysisError::AlreadyRunning) => {
                    debug!("Analyze pressed while a run is staging");
                    Task::none()
                }
            },
            Message::Analysis(event) => {
                if self.analysis.apply(event) {
                    match self.analysis.result() {
                        Some(result) => self.result_card = Some(ResultView::render(result)),
                        None => self.notice = Some(Notice::failure("Prediction failed")),
                    }
                }
                Task::none()
            }
            Message::ResetAnalysis => {
                self.analysis.reset();
                if !self.analysis.is_staging() {
                    self.result_card = None;
                }
                Task::none()
            }
            Message::HealthTick => {
                let ticket = self.health.issue();
                Task::perform(
                    health::probe(Arc::clone(&self.client), ticket),
                    |(ticket, online)| Message::HealthChecked(ticket, online),
                )
            }
            Message::HealthChecked(ticket, online) => {
                self.health.record(ticket, online);
                Task::none()
            }
            Message::LoadMetrics => {
                self.metrics = MetricsView::Loading;
                Task::perform(
                    metrics::load(Arc::clone(&self.client), self.config.metrics_path.clone()),
                    |result| Message::MetricsLoaded(result.map(Arc::new).map_err(|err| err.to_string())),
                )
            }
            Message::MetricsLoaded(Ok(series)) => {
                self.metrics = MetricsView::Ready(series);
                Task::none()
            }
            Message::MetricsLoaded(Err(reason)) => {
                warn!("⚠️  {}", reason);
                self.metrics = MetricsView::Failed(reason);
                Task::none()
            }
            Message::DismissNotice => {
                self.notice = None;
                Task::none()
            }
        }
    }

    /// Swap in a newly acquired image
    fn select(&mut self, blob: ImageBlob) {
        self.zoomed = false;
        self.slot.select(blob);
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let mut page = Column::new().spacing(24).padding(32);

        page = page.push(self.view_header());
        if let Some(notice) = &self.notice {
            page = page.push(notice::view(notice));
        }
        page = page
            .push(
                row![
                    container(self.view_upload()).width(Length::FillPortion(2)),
                    container(self.view_result()).width(Length::FillPortion(3)),
                ]
                .spacing(24),
            )
            .push(self.view_metrics());

        let mut layers: Vec<Element<'_, Message>> =
            vec![scrollable(page).width(Length::Fill).height(Length::Fill).into()];
        if self.samples_open {
            layers.push(self.view_samples());
        }
        if self.zoomed {
            if let Some(preview) = self.slot.preview() {
                layers.push(
                    opaque(
                        mouse_area(
                            center(image(preview.clone()).width(Length::Fill).height(Length::Fill))
                                .padding(40)
                                .style(backdrop),
                        )
                        .on_press(Message::ToggleZoom),
                    ),
                );
            }
        }

        Stack::with_children(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_header(&self) -> Element<'_, Message> {
        let (label, color) = if self.health.is_online() {
            ("● Server Online", Color::from_rgb(0.13, 0.77, 0.37))
        } else {
            ("● Server Offline", Color::from_rgb(0.94, 0.27, 0.27))
        };
        let checked = match self.health.last_checked() {
            Some(at) => format!("checked {}", at.format("%H:%M:%S")),
            None => "checking...".to_string(),
        };

        row![
            column![
                text("PulmoScan AI").size(36),
                text("Chest X-ray analysis powered by deep learning").size(14),
            ]
            .spacing(4)
            .width(Length::Fill),
            column![text(label).color(color).size(16), text(checked).size(12)]
                .spacing(2)
                .align_x(Alignment::End),
        ]
        .align_y(Alignment::Center)
        .into()
    }

    fn view_upload(&self) -> Element<'_, Message> {
        let prompt = if self.drag_active {
            "Release to select the radiograph"
        } else {
            "Drag & drop a chest X-ray here"
        };

        let preview: Element<'_, Message> = match self.slot.preview() {
            Some(handle) => mouse_area(image(handle.clone()).height(Length::Fixed(280.0)))
                .on_press(Message::ToggleZoom)
                .into(),
            None => text("No image selected").size(14).into(),
        };

        let zone_style: fn(&Theme) -> container::Style = if self.drag_active {
            container::rounded_box
        } else {
            container::bordered_box
        };
        let drop_zone = container(
            column![text(prompt).size(16), preview]
                .spacing(12)
                .align_x(Alignment::Center),
        )
        .padding(24)
        .center_x(Length::Fill)
        .style(zone_style);

        let staging = self.analysis.is_staging();
        let finished = matches!(
            self.analysis,
            AnalysisState::Completed(_) | AnalysisState::Failed(_)
        );

        let actions = row![
            button("Choose File").on_press(Message::PickFile).padding(10),
            button("Try Sample").on_press(Message::ShowSamples).padding(10),
            button(if staging { "Analyzing..." } else { "Analyze" })
                .on_press_maybe((!staging).then_some(Message::Analyze))
                .padding(10),
            button("Reset")
                .on_press_maybe(finished.then_some(Message::ResetAnalysis))
                .padding(10)
                .style(button::secondary),
        ]
        .spacing(8);

        let mut panel = column![drop_zone, actions].spacing(16);

        if let Some(selected) = self.slot.active() {
            panel = panel.push(text(format!("Selected: {}", selected.name())).size(13));
        }

        if let (Some(label), AnalysisState::Staging { step, .. }) =
            (self.analysis.staging_label(), &self.analysis)
        {
            let progress = (*step + 1) as f32 / STAGE_LABELS.len() as f32;
            panel = panel.push(
                column![text(label).size(14), progress_bar(0.0..=1.0, progress).height(6)].spacing(6),
            );
        }

        panel.into()
    }

    fn view_result(&self) -> Element<'_, Message> {
        match (&self.result_card, &self.analysis) {
            (Some(card), _) => result_card::view(card),
            (None, AnalysisState::Failed(reason)) => container(
                column![
                    text("Prediction failed").size(20),
                    text(reason).size(13),
                ]
                .spacing(8),
            )
            .padding(20)
            .width(Length::Fill)
            .style(container::bordered_box)
            .into(),
            _ => container(text("Select an image and press Analyze to see the diagnosis").size(14))
                .padding(20)
                .width(Length::Fill)
                .style(container::bordered_box)
                .into(),
        }
    }

    fn view_metrics(&self) -> Element<'_, Message> {
        let body: Element<'_, Message> = match &self.metrics {
            MetricsView::Loading => text("Loading training results...").size(14).into(),
            MetricsView::Failed(reason) => column![
                text(format!("Training results unavailable: {}", reason)).size(14),
                button("Retry").on_press(Message::LoadMetrics).padding(8),
            ]
            .spacing(8)
            .into(),
            MetricsView::Ready(series) if series.is_empty() => {
                text("The training results contain no epochs").size(14).into()
            }
            MetricsView::Ready(series) => column![
                line_chart::view("Accuracy Metrics", series, &ACCURACY_LINES),
                line_chart::view("Loss Metrics", series, &LOSS_LINES),
                line_chart::view("Learning Rate", series, &LEARNING_RATE_LINES),
            ]
            .spacing(24)
            .into(),
        };

        container(
            column![
                text("Model Training Metrics").size(24),
                text("Training Performance Visualization").size(13),
                body,
            ]
            .spacing(12),
        )
        .padding(20)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
    }

    fn view_samples(&self) -> Element<'_, Message> {
        let entries = Column::with_children(self.config.samples.iter().map(|name| {
            let loading = self.sample_loading.as_deref() == Some(name.as_str());
            let label = if loading {
                format!("{} (loading...)", name)
            } else {
                name.clone()
            };
            button(text(label))
                .on_press_maybe(
                    self.sample_loading
                        .is_none()
                        .then(|| Message::SampleChosen(name.clone())),
                )
                .width(Length::Fill)
                .style(button::secondary)
                .into()
        }))
        .spacing(8);

        let dialog = container(
            column![
                text("Sample Images").size(22),
                entries,
                button("Close").on_press(Message::HideSamples).padding(8),
            ]
            .spacing(16),
        )
        .padding(24)
        .width(Length::Fixed(360.0))
        .style(container::rounded_box);

        opaque(center(dialog).style(backdrop))
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            Subscription::run_with_id("health-monitor", health::ticks(self.config.health_interval()))
                .map(|_| Message::HealthTick),
            event::listen_with(window_event),
        ])
    }
}

/// Translate window drag & drop events
fn window_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}

/// Dimmed background behind overlays
fn backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(
            Color {
                a: 0.7,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    }
}

fn main() -> iced::Result {
    logging::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            warn!("⚠️  {}; using default settings", err);
            AppConfig::default()
        }
    };

    let client = match HttpClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("Failed to build the HTTP client: {}", err);
            std::process::exit(1);
        }
    };

    iced::application("PulmoScan AI", Dashboard::update, Dashboard::view)
        .subscription(Dashboard::subscription)
        .theme(Dashboard::theme)
        .centered()
        .run_with(move || Dashboard::new(config, client))
}
