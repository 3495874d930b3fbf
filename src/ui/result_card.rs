//! Diagnosis card for a completed analysis
//!
//! [`ResultView::render`] resolves everything shown on the card from a
//! [`DiagnosticResult`]; [`view`] lays it out.

use iced::widget::{column, container, progress_bar, row, text, Column};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::descriptions::{self, DescriptionEntry};
use crate::state::data::DiagnosticResult;
use crate::Message;

/// Display-ready content of the diagnosis card
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub class_name: String,
    /// Confidence as a percentage with one decimal, e.g. "97.0%"
    pub confidence_text: String,
    /// Fill of the confidence bar on a 0..=100 scale
    pub bar_value: f32,
    pub about: &'static str,
    pub signs: Vec<&'static str>,
    pub patterns: Vec<&'static str>,
    pub insights: &'static str,
}

impl ResultView {
    /// Resolve the card for `result`; an unknown class leaves the
    /// descriptive fields empty
    pub fn render(result: &DiagnosticResult) -> Self {
        let percent = result.confidence * 100.0;
        let entry = descriptions::lookup(&result.predicted_class);

        ResultView {
            class_name: result.predicted_class.clone(),
            confidence_text: format!("{:.1}%", round_half_up(percent)),
            bar_value: percent as f32,
            about: entry.map_or("", |e| e.about),
            signs: entry.map(DescriptionEntry::sign_items).unwrap_or_default(),
            patterns: entry.map(DescriptionEntry::pattern_tags).unwrap_or_default(),
            insights: entry.map_or("", |e| e.deep_learning_insights),
        }
    }
}

/// Round to one decimal with ties going away from zero ("6.25" shows as "6.3")
fn round_half_up(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn view(card: &ResultView) -> Element<'_, Message> {
    let header = row![
        column![
            text(&card.class_name).size(26),
            text("AI-Powered Diagnosis").size(13),
        ]
        .spacing(4)
        .width(Length::Fill),
        column![
            text(&card.confidence_text).size(30),
            text("Confidence Level").size(13),
        ]
        .spacing(4)
        .align_x(Alignment::End),
    ]
    .align_y(Alignment::Center);

    let bar = progress_bar(0.0..=100.0, card.bar_value).height(8);

    let signs = Column::with_children(
        card.signs
            .iter()
            .map(|sign| text(format!("• {}", sign)).size(14).into()),
    )
    .spacing(6);

    let chips = Wrap::with_elements(
        card.patterns
            .iter()
            .map(|tag| {
                container(text(*tag).size(13))
                    .padding([4, 10])
                    .style(container::bordered_box)
                    .into()
            })
            .collect(),
    )
    .spacing(8.0)
    .line_spacing(8.0);

    let body = column![
        section("Condition Overview", text(card.about).size(14).into()),
        row![
            section("Clinical Indicators", signs.into()),
            section("Visual Patterns", chips.into()),
        ]
        .spacing(24),
        section(
            "Model Interpretation",
            container(text(card.insights).size(14))
                .padding(12)
                .style(container::rounded_box)
                .into(),
        ),
    ]
    .spacing(20);

    container(column![header, bar, body].spacing(16))
        .padding(20)
        .width(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn section<'a>(title: &'a str, content: Element<'a, Message>) -> Element<'a, Message> {
    column![text(title).size(18), content]
        .spacing(10)
        .width(Length::Fill)
        .into()
}
