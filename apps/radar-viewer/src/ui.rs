//! The eframe window around a [`ViewerSession`].

use std::path::PathBuf;

use eframe::egui::{
    self, Align2, Color32, ColorImage, Event, Pos2, Rect, RichText, Sense, TextureHandle,
    TextureOptions, Vec2,
};
use map_interaction::{PointerButton, PointerEvent, ScreenPoint, ScrollDirection};
use qc_filters::QcFilter;
use radar_common::{GeoPoint, RadarError, RadarResult};
use renderer::ColormapChoice;
use tracing::{error, info};

use crate::commands::Command;
use crate::session::{about_text, format_readout, ViewerSession};

const RADAR_FILE_EXTENSIONS: [&str; 3] = ["bin", "bz2", "gz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
struct Dialog {
    title: String,
    message: String,
    kind: DialogKind,
}

/// Main window.
pub struct ViewerApp {
    session: ViewerSession,
    texture: Option<(u64, TextureHandle)>,
    dialog: Option<Dialog>,
    hover: Option<GeoPoint>,
    pointer_on_map: bool,
}

impl ViewerApp {
    pub fn new(session: ViewerSession) -> Self {
        Self {
            session,
            texture: None,
            dialog: None,
            hover: None,
            pointer_on_map: false,
        }
    }

    fn run(&mut self, ctx: &egui::Context, command: Command) {
        let result = match command {
            Command::OpenFile => self.open_file(),
            Command::OpenFolder => self.open_folder(),
            Command::SaveImage => self.save_image(),
            Command::Quit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                Ok(())
            }
            Command::PreviousFile => self.session.previous_file().map(|_| ()),
            Command::NextFile => self.session.next_file().map(|_| ()),
            Command::ToggleOverlay => self.session.toggle_overlay().map(|_| ()),
            Command::SetColormap(choice) => self.session.set_colormap(choice),
            Command::ApplyQc(filter) => self.session.apply_qc(filter),
            Command::Plot => self.session.plot(),
            Command::About => {
                self.dialog = Some(Dialog {
                    title: "About".to_string(),
                    message: about_text(),
                    kind: DialogKind::Info,
                });
                Ok(())
            }
        };
        if let Err(e) = result {
            self.report(command, e);
        }
    }

    fn report(&mut self, command: Command, err: RadarError) {
        if err.is_warning() {
            info!(command = ?command, "{}", err);
        } else {
            error!(command = ?command, error = %err, "Command failed");
        }
        self.dialog = Some(Dialog {
            title: err.dialog_title().to_string(),
            message: err.to_string(),
            kind: if err.is_warning() {
                DialogKind::Warning
            } else {
                DialogKind::Error
            },
        });
    }

    fn open_file(&mut self) -> RadarResult<()> {
        let picked = rfd::FileDialog::new()
            .set_title("Open radar file")
            .add_filter("Radar files", &RADAR_FILE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file();
        match picked {
            Some(path) => self.session.open_file(&path),
            None => Ok(()),
        }
    }

    fn open_folder(&mut self) -> RadarResult<()> {
        match rfd::FileDialog::new().set_title("Open radar folder").pick_folder() {
            Some(dir) => self.session.open_folder(&dir),
            None => Ok(()),
        }
    }

    fn save_image(&mut self) -> RadarResult<()> {
        if self.session.view().is_none() {
            return Err(RadarError::user_input("No image to save"));
        }
        let suggested = self
            .session
            .file_name()
            .map(|name| format!("{}.png", name))
            .unwrap_or_else(|| "radar.png".to_string());
        let picked: Option<PathBuf> = rfd::FileDialog::new()
            .set_title("Save image as")
            .set_file_name(suggested)
            .add_filter("PNG image", &["png"])
            .add_filter("JPEG image", &["jpg", "jpeg"])
            .save_file();
        match picked {
            Some(path) => self.session.save_image(&path).map(|_| ()),
            None => Ok(()),
        }
    }

    fn shortcuts(&mut self, ctx: &egui::Context) -> Vec<Command> {
        ctx.input_mut(|i| {
            Command::WITH_SHORTCUTS
                .iter()
                .filter(|command| {
                    command
                        .shortcut()
                        .map(|s| i.consume_shortcut(&s))
                        .unwrap_or(false)
                })
                .copied()
                .collect()
        })
    }

    fn menu_bar(&self, ctx: &egui::Context, pending: &mut Vec<Command>) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    menu_item(ui, Command::OpenFile, pending);
                    menu_item(ui, Command::OpenFolder, pending);
                    ui.separator();
                    menu_item(ui, Command::PreviousFile, pending);
                    menu_item(ui, Command::NextFile, pending);
                    ui.separator();
                    menu_item(ui, Command::SaveImage, pending);
                    ui.separator();
                    menu_item(ui, Command::Quit, pending);
                });

                ui.menu_button("View", |ui| {
                    let overlay = if self.session.overlay_visible() {
                        "✓ Boundary Overlay"
                    } else {
                        "  Boundary Overlay"
                    };
                    let shortcut = Command::ToggleOverlay
                        .shortcut()
                        .map(|s| ui.ctx().format_shortcut(&s))
                        .unwrap_or_default();
                    if ui
                        .add(egui::Button::new(overlay).shortcut_text(shortcut))
                        .clicked()
                    {
                        pending.push(Command::ToggleOverlay);
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.label(RichText::new("Colormap").weak());
                    for choice in ColormapChoice::ALL {
                        let selected = self.session.colormap_choice() == choice;
                        if ui.radio(selected, choice.label()).clicked() {
                            pending.push(Command::SetColormap(choice));
                            ui.close_menu();
                        }
                    }
                });

                ui.menu_button("QC", |ui| {
                    for filter in QcFilter::ALL {
                        menu_item(ui, Command::ApplyQc(filter), pending);
                    }
                });

                ui.menu_button("Help", |ui| {
                    menu_item(ui, Command::About, pending);
                });
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match self.hover {
                    Some(point) => ui.label(format_readout(point)),
                    None => ui.label(self.session.status()),
                };
                if let Some((position, count)) = self.session.sequence_position() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("File {} of {}", position + 1, count));
                    });
                }
            });
        });
    }

    fn parameter_panel(&mut self, ctx: &egui::Context, pending: &mut Vec<Command>) {
        egui::SidePanel::left("parameters")
            .default_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("Data and plot parameters").strong());
                ui.separator();

                let Some(file_name) = self.session.file_name().map(str::to_string) else {
                    ui.label("No file loaded.");
                    ui.label("Use File › Open to choose a radar file.");
                    return;
                };
                ui.label("Current file:");
                let full_path = self
                    .session
                    .file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                ui.label(RichText::new(file_name).monospace())
                    .on_hover_text(full_path);
                ui.add_space(8.0);

                let elevations = self
                    .session
                    .scan()
                    .map(|scan| scan.elevation_angles())
                    .unwrap_or_default();
                let selection = self.session.selection().clone();

                ui.label("Elevation:");
                let current = elevations
                    .get(selection.tilt)
                    .map(|e| format!("{:.1}°", e))
                    .unwrap_or_default();
                let mut chosen_tilt = None;
                egui::ComboBox::from_id_salt("tilt")
                    .selected_text(current)
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        for (i, elevation) in elevations.iter().enumerate() {
                            let label = format!("{:.1}°", elevation);
                            if ui.selectable_label(i == selection.tilt, label).clicked() {
                                chosen_tilt = Some(i);
                            }
                        }
                    });
                if let Some(tilt) = chosen_tilt {
                    if let Err(e) = self.session.select_tilt(tilt) {
                        self.report(Command::Plot, e);
                    }
                }

                ui.label("Product:");
                let products = self.session.products();
                let current = self
                    .session
                    .selection()
                    .product
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                let mut chosen_product = None;
                egui::ComboBox::from_id_salt("product")
                    .selected_text(current)
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        for product in &products {
                            let selected = self.session.selection().product == Some(*product);
                            if ui.selectable_label(selected, product.as_str()).clicked() {
                                chosen_product = Some(*product);
                            }
                        }
                    });
                if let Some(product) = chosen_product {
                    if let Err(e) = self.session.select_product(product) {
                        self.report(Command::Plot, e);
                    }
                }

                ui.label("Range (km):");
                let mut range_text = self.session.selection().range_text.clone();
                let response = ui.add(egui::TextEdit::singleline(&mut range_text).desired_width(180.0));
                if response.changed() {
                    self.session.set_range_text(range_text);
                }
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(8.0);
                if ui.button("Plot").clicked() || submitted {
                    pending.push(Command::Plot);
                }

                if self.session.sequence_position().is_some() {
                    ui.add_space(12.0);
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("◀ Previous").clicked() {
                            pending.push(Command::PreviousFile);
                        }
                        if ui.button("Next ▶").clicked() {
                            pending.push(Command::NextFile);
                        }
                    });
                }
            });
    }

    fn map_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| {
                let Some(texture) = self.current_texture(ctx) else {
                    self.hover = None;
                    return;
                };
                let image_size = texture.size_vec2();
                let (area, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
                let scale = (area.width() / image_size.x)
                    .min(area.height() / image_size.y)
                    .max(f32::EPSILON);
                let rect = Rect::from_center_size(area.center(), image_size * scale);
                ui.painter().image(
                    texture.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );

                let to_figure = |pos: Pos2| {
                    let local = (pos - rect.min) / scale;
                    ScreenPoint::new(local.x as f64, local.y as f64)
                };
                self.forward_pointer(ui, &response, &to_figure);

                self.hover = response
                    .hover_pos()
                    .and_then(|pos| self.session.cursor_position(to_figure(pos)));
            });
    }

    /// Translate this frame's raw pointer input into controller events.
    fn forward_pointer(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        to_figure: impl Fn(Pos2) -> ScreenPoint,
    ) {
        let over_map = response.contains_pointer();
        let (events, scroll, hover) = ui.input(|i| {
            (
                i.events.clone(),
                i.raw_scroll_delta.y,
                i.pointer.hover_pos(),
            )
        });

        for event in events {
            let pointer = match event {
                Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    let position = to_figure(pos);
                    if pressed && over_map {
                        PointerEvent::Press { position, button }
                    } else if !pressed {
                        PointerEvent::Release { position, button }
                    } else {
                        continue;
                    }
                }
                Event::PointerMoved(pos) => {
                    let position = to_figure(pos);
                    let inside = self
                        .session
                        .view()
                        .map(|v| v.frame().contains_pixel(position.x, position.y))
                        .unwrap_or(false);
                    let was_inside = std::mem::replace(&mut self.pointer_on_map, inside);
                    if !inside && was_inside {
                        PointerEvent::Leave
                    } else {
                        PointerEvent::Move { position }
                    }
                }
                Event::PointerGone => {
                    self.pointer_on_map = false;
                    PointerEvent::Leave
                }
                _ => continue,
            };
            self.session.pointer(pointer);
        }

        if scroll != 0.0 && over_map {
            if let Some(pos) = hover {
                let direction = if scroll > 0.0 {
                    ScrollDirection::Forward
                } else {
                    ScrollDirection::Backward
                };
                self.session.pointer(PointerEvent::Scroll {
                    position: to_figure(pos),
                    direction,
                });
            }
        }
    }

    /// Upload the session's image when it changed since the last frame.
    fn current_texture(&mut self, ctx: &egui::Context) -> Option<TextureHandle> {
        let Some(view) = self.session.view() else {
            self.texture = None;
            return None;
        };
        let revision = self.session.revision();
        let stale = self
            .texture
            .as_ref()
            .map(|(seen, _)| *seen != revision)
            .unwrap_or(true);
        if stale {
            let image = view.image();
            let color_image = ColorImage::from_rgba_unmultiplied(
                [image.width() as usize, image.height() as usize],
                image.as_raw(),
            );
            let handle = ctx.load_texture("radar_map", color_image, TextureOptions::LINEAR);
            self.texture = Some((revision, handle));
        }
        self.texture.as_ref().map(|(_, handle)| handle.clone())
    }

    fn dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.dialog.as_ref() else {
            return;
        };
        let mut close = false;
        let color = match dialog.kind {
            DialogKind::Error => Color32::from_rgb(200, 40, 40),
            DialogKind::Warning => Color32::from_rgb(200, 140, 0),
            DialogKind::Info => ctx.style().visuals.text_color(),
        };
        egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(RichText::new(&dialog.message).color(color));
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            });
        if close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.dialog = None;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut pending = if self.dialog.is_none() {
            self.shortcuts(ctx)
        } else {
            Vec::new()
        };

        self.menu_bar(ctx, &mut pending);
        self.status_bar(ctx);
        self.parameter_panel(ctx, &mut pending);
        self.map_panel(ctx);
        self.dialog(ctx);

        for command in pending {
            self.run(ctx, command);
        }
    }
}

fn menu_item(ui: &mut egui::Ui, command: Command, pending: &mut Vec<Command>) {
    let mut button = egui::Button::new(command.label());
    if let Some(shortcut) = command.shortcut() {
        button = button.shortcut_text(ui.ctx().format_shortcut(&shortcut));
    }
    if ui.add(button).clicked() {
        pending.push(command);
        ui.close_menu();
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}
