/// Class button strip
///
/// One button per class. When the current image has autolabels that line
/// up with the class set, every button is filled with its confidence color.
use iced::widget::{button, text};
use iced::{Background, Color, Element, Length, Pixels, Theme};
use iced_aw::Wrap;

use crate::color::{confidence_color, ConfidenceColor};
use crate::config::CLASS_BUTTON_HEIGHT;
use crate::state::ClassSet;
use crate::Message;

const MIN_BUTTON_WIDTH: f32 = 120.0;

pub fn class_buttons<'a>(
    classes: &'a ClassSet,
    confidences: Option<&[f32]>,
    enabled: bool,
) -> Element<'a, Message> {
    let buttons: Vec<Element<'a, Message>> = classes
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let overlay = confidences
                .and_then(|values| values.get(index))
                .map(|&value| confidence_color(value));

            let mut class_button = button(text(name).width(Length::Fill).height(Length::Fill).center())
                .width(Length::Fixed(button_width(classes.len())))
                .height(CLASS_BUTTON_HEIGHT)
                .padding(10)
                .on_press_maybe(enabled.then(|| Message::Classify(name.to_string())));

            if let Some(overlay) = overlay {
                class_button = class_button.style(move |theme: &Theme, status| {
                    overlay_style(theme, status, overlay)
                });
            }

            class_button.into()
        })
        .collect();

    Wrap::with_elements(buttons)
        .spacing(Pixels(4.0))
        .line_spacing(Pixels(4.0))
        .into()
}

/// Share a nominal strip width between the buttons, never narrower than MIN_BUTTON_WIDTH
fn button_width(count: usize) -> f32 {
    const STRIP_WIDTH: f32 = 1200.0;
    (STRIP_WIDTH / count.max(1) as f32).max(MIN_BUTTON_WIDTH)
}

fn overlay_style(theme: &Theme, status: button::Status, overlay: ConfidenceColor) -> button::Style {
    let [r, g, b] = overlay.fill;
    let fill = Color::from_rgb8(r, g, b);
    let fill = match status {
        button::Status::Hovered | button::Status::Pressed => Color { a: 0.85, ..fill },
        _ => fill,
    };

    button::Style {
        background: Some(Background::Color(fill)),
        text_color: if overlay.light_text {
            Color::WHITE
        } else {
            Color::BLACK
        },
        ..button::primary(theme, status)
    }
}
