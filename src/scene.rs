//! Retained draw commands that gauges build and flush onto a canvas.

use crate::canvas::{Align, Canvas, Color};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Arc {
        cx: i32,
        cy: i32,
        r: i32,
        thickness: i32,
        start_angle: f64,
        arc_span: f64,
        color: Color,
    },
    Tick {
        cx: i32,
        cy: i32,
        r: i32,
        angle: f64,
        length: i32,
        thickness: f32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: Color,
        align: Align,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        tapered: bool,
        color: Color,
    },
    Circle {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
        alpha: f32,
    },
}

/// Ordered list of draw commands, flushed onto a canvas in one go.
#[derive(Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn render(&self, canvas: &mut Canvas<'_>) {
        for command in &self.commands {
            match command {
                DrawCommand::Arc {
                    cx,
                    cy,
                    r,
                    thickness,
                    start_angle,
                    arc_span,
                    color,
                } => {
                    canvas.arc(*cx, *cy, *r, *thickness, *start_angle, *arc_span, *color);
                }
                DrawCommand::Tick {
                    cx,
                    cy,
                    r,
                    angle,
                    length,
                    thickness,
                    color,
                } => {
                    let outer_x = *cx as f64 + angle.cos() * (*r as f64 - 1.0);
                    let outer_y = *cy as f64 + angle.sin() * (*r as f64 - 1.0);
                    let inner_x = *cx as f64 + angle.cos() * (*r as f64 - *length as f64);
                    let inner_y = *cy as f64 + angle.sin() * (*r as f64 - *length as f64);
                    canvas.line(
                        inner_x.round() as i32,
                        inner_y.round() as i32,
                        outer_x.round() as i32,
                        outer_y.round() as i32,
                        *thickness,
                        *color,
                    );
                }
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                    align,
                } => {
                    canvas.text(*x, *y, text, *font_size, *color, *align);
                }
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    tapered,
                    color,
                } => {
                    if *tapered {
                        canvas.tapered_line(*x0, *y0, *x1, *y1, *thickness, *color);
                    } else {
                        canvas.line(*x0, *y0, *x1, *y1, *thickness, *color);
                    }
                }
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                    alpha,
                } => {
                    canvas.fill_circle(*cx, *cy, *radius, *color, *alpha);
                }
            }
        }
    }
}
