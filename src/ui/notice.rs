//! Dismissible banner for user-facing faults

use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length};

use crate::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The user has to do something first (e.g. select an image)
    Validation,
    /// A remote operation failed
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Validation,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

pub fn view(notice: &Notice) -> Element<'_, Message> {
    let style: fn(&iced::Theme) -> container::Style = match notice.kind {
        NoticeKind::Validation => container::rounded_box,
        NoticeKind::Failure => danger_box,
    };

    container(
        row![
            text(&notice.message).width(Length::Fill),
            button("Dismiss")
                .on_press(Message::DismissNotice)
                .style(button::text),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .width(Length::Fill)
    .style(style)
    .into()
}

fn danger_box(theme: &iced::Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.danger.weak.color.into()),
        text_color: Some(palette.danger.weak.text),
        border: iced::border::rounded(4),
        ..container::Style::default()
    }
}
