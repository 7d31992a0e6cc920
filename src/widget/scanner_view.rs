//! Scanner window layout
//!
//! Title, error banner, camera list, preview surface, start/stop button,
//! result card and decoder settings, top to bottom.

use cosmic::Element;
use cosmic::cosmic_theme::Spacing;
use cosmic::iced::{Color, ContentFit, Length};
use cosmic::iced_core::{Background, Border, alignment};
use cosmic::iced_widget::{column, row, toggler};
use cosmic::widget::{button, container, text};

use crate::capture::image::{PREVIEW_HEIGHT, PREVIEW_WIDTH};
use crate::fl;
use crate::session::messages::Msg;
use crate::session::state::ScannerState;

/// Settings shown below the scanner
pub struct DecoderSettings<'a> {
    pub labels: &'a [String],
    pub selected: usize,
    pub copy_on_scan: bool,
}

pub fn view<'a>(
    state: &'a ScannerState,
    settings: DecoderSettings<'a>,
    spacing: Spacing,
) -> Element<'a, Msg> {
    let space_s = spacing.space_s;
    let space_xs = spacing.space_xs;

    let title = container(text::title3(fl!("app-title"))).center_x(Length::Fill);

    let mut content = column![title].spacing(space_s).width(Length::Fill);

    if let Some(message) = state.error_message() {
        content = content.push(error_banner(message, space_xs));
    }

    if !state.cameras.is_empty() {
        content = content.push(camera_list(state, space_xs));
    }

    content = content.push(preview_surface(state));

    // Stop also cancels a session that is still opening
    let scan_button = if state.is_active() {
        button::destructive(fl!("stop-scanning")).on_press(Msg::Stop)
    } else {
        button::suggested(fl!("start-scanning")).on_press(Msg::Start)
    };
    content = content.push(container(scan_button).center_x(Length::Fill));

    if let Some(result) = &state.result {
        let actions = row![
            button::standard(fl!("copy-result")).on_press(Msg::CopyResult),
            button::text(fl!("clear-result")).on_press(Msg::ClearResult),
        ]
        .spacing(space_xs);

        let card = column![
            text::heading(fl!("scan-result")),
            text::body(fl!("result-text", text = result.text.clone())),
            text::body(fl!("result-format", format = result.format.label())),
            actions,
        ]
        .spacing(space_xs)
        .align_x(alignment::Horizontal::Center)
        .width(Length::Fill);

        content = content.push(styled_box(card, Color::from_rgb(0.9, 0.95, 0.9), space_s));
    }

    content = content.push(decoder_settings(settings, state.is_active(), space_xs));

    container(content)
        .padding(space_s)
        .max_width(400.0)
        .center_x(Length::Fill)
        .into()
}

fn error_banner<'a>(message: String, padding: u16) -> Element<'a, Msg> {
    container(text::body(message))
        .padding(padding)
        .width(Length::Fill)
        .class(cosmic::theme::Container::Custom(Box::new(|_theme| {
            cosmic::iced::widget::container::Style {
                background: Some(Background::Color(Color::from_rgb(1.0, 0.87, 0.87))),
                text_color: Some(Color::from_rgb(0.8, 0.0, 0.0)),
                border: Border {
                    radius: 5.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })))
        .into()
}

fn camera_list<'a>(state: &'a ScannerState, padding: u16) -> Element<'a, Msg> {
    let mut list = column![text::heading(fl!("available-cameras"))].spacing(padding / 2);
    for label in &state.camera_labels {
        list = list.push(text::body(label.as_str()));
    }

    // Switching cameras applies to the next session
    let selector = cosmic::widget::dropdown(
        &state.camera_labels,
        state.selected_camera,
        Msg::SelectCamera,
    );
    let selector: Element<'a, Msg> = if state.is_active() {
        container(text::caption(
            state
                .selected_camera
                .and_then(|i| state.camera_labels.get(i))
                .map(String::as_str)
                .unwrap_or_default(),
        ))
        .into()
    } else {
        selector.into()
    };

    let content = column![list, selector].spacing(padding);
    styled_box(content, Color::from_rgb(0.94, 0.94, 0.94), padding)
}

fn preview_surface<'a>(state: &'a ScannerState) -> Element<'a, Msg> {
    let inner: Element<'a, Msg> = match (&state.preview, state.scanning) {
        (Some(frame), true) => cosmic::widget::image(frame.handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        (None, true) => text::body("").into(),
        _ if state.starting => text::body("").into(),
        _ => text::body(fl!("camera-placeholder"))
            .class(cosmic::theme::Text::Color(Color::from_rgb(0.53, 0.53, 0.53)))
            .into(),
    };

    // The frame decoder's scan box is sized against this surface
    let surface = container(inner)
        .width(Length::Fixed(PREVIEW_WIDTH as f32))
        .height(Length::Fixed(PREVIEW_HEIGHT as f32))
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Center)
        .class(cosmic::theme::Container::Custom(Box::new(|_theme| {
            cosmic::iced::widget::container::Style {
                background: Some(Background::Color(Color::from_rgb(0.94, 0.94, 0.94))),
                border: Border {
                    radius: 10.0.into(),
                    width: 2.0,
                    color: Color::from_rgb(0.8, 0.8, 0.8),
                },
                ..Default::default()
            }
        })));

    container(surface).center_x(Length::Fill).into()
}

fn decoder_settings<'a>(
    settings: DecoderSettings<'a>,
    scanning: bool,
    spacing: u16,
) -> Element<'a, Msg> {
    let decoder: Element<'a, Msg> = if scanning {
        text::body(
            settings
                .labels
                .get(settings.selected)
                .map(String::as_str)
                .unwrap_or_default(),
        )
        .into()
    } else {
        cosmic::widget::dropdown(settings.labels, Some(settings.selected), Msg::SelectDecoder).into()
    };

    let decoder_row = row![
        text::body(fl!("decoder")),
        cosmic::widget::horizontal_space(),
        decoder,
    ]
    .spacing(spacing)
    .align_y(cosmic::iced_core::Alignment::Center)
    .width(Length::Fill);

    let copy_row = row![
        text::body(fl!("copy-on-scan")),
        cosmic::widget::horizontal_space(),
        toggler(settings.copy_on_scan)
            .on_toggle(Msg::CopyOnScan)
            .size(24.0),
    ]
    .spacing(spacing)
    .align_y(cosmic::iced_core::Alignment::Center)
    .width(Length::Fill);

    column![decoder_row, copy_row].spacing(spacing).into()
}

/// Rounded box with a flat background
fn styled_box<'a>(
    content: impl Into<Element<'a, Msg>>,
    background: Color,
    padding: u16,
) -> Element<'a, Msg> {
    container(content)
        .padding(padding)
        .width(Length::Fill)
        .class(cosmic::theme::Container::Custom(Box::new(move |_theme| {
            cosmic::iced::widget::container::Style {
                background: Some(Background::Color(background)),
                text_color: Some(Color::BLACK),
                border: Border {
                    radius: 5.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })))
        .into()
}
