use std::f64::consts::PI;

use bon::Builder;
use log::trace;

use crate::bridge::{CommonVariable, VariableBridge};
use crate::canvas::{Align, Canvas, Color};
use crate::context::ApplicationContext;
use crate::instrument::{Instrument, Placement};
use crate::scene::{DrawCommand, Scene};

/// Size the proportions below were drawn at
const REFERENCE_SIZE: f64 = 300.0;

#[derive(Debug, Clone, Builder)]
pub struct DialConfig {
    /// Settings key, also the panel label
    #[builder(into)]
    pub name: String,
    pub placement: Placement,
    /// Variable driving the needle
    pub variable: CommonVariable,
    /// Multiplier from raw provider units to dial units
    #[builder(default = 1.0)]
    pub scale: f64,
    #[builder(default = (0.0, 100.0))]
    pub range: (f64, f64),
    #[builder(into, default = String::new())]
    pub units: String,

    // Dial
    #[builder(default = 45.0)]
    pub dial_margin: f64,
    #[builder(default = 4.0)]
    pub dial_thickness: f64,
    #[builder(default = 24.0)]
    pub numbers_font_size: f32,
    #[builder(default = 22.0)]
    pub ticks_to_numbers_distance: f64,
    #[builder(default = 1.5 * PI)]
    pub arc_span: f64,
    #[builder(default = 0.75 * PI)]
    pub start_angle: f64,

    // Ticks
    #[builder(default = 11)]
    pub ticks_count: usize,
    #[builder(default = 4)]
    pub minor_ticks_per_interval: usize,
    #[builder(default = 30.0)]
    pub major_tick_length: f64,
    #[builder(default = 15.0)]
    pub minor_tick_length: f64,
    #[builder(default = 3.0)]
    pub major_tick_thickness: f32,
    #[builder(default = 1.0)]
    pub minor_tick_thickness: f32,

    // Needle
    #[builder(default = 0.95)]
    pub needle_length_factor: f64,
    #[builder(default = 40.0)]
    pub needle_back_length: f64,
    #[builder(default = 6.0)]
    pub needle_width: f32,
    #[builder(default = 0.2)]
    pub needle_lerp_factor: f64,
    #[builder(default = 9.0)]
    pub dot_radius: f64,

    // Colors
    #[builder(default = Color::new(0x1c, 0x1c, 0x1c))]
    pub face_color: Color,
    #[builder(default = Color::new(0xf0, 0xf0, 0xf0))]
    pub dial_color: Color,
    #[builder(default = Color::new(0xff, 0xff, 0xff))]
    pub needle_color: Color,
}

impl DialConfig {
    /// Dial range in raw provider units, lower bound first.
    pub fn raw_range(&self) -> (f64, f64) {
        let (a, b) = (self.range.0 / self.scale, self.range.1 / self.scale);
        (a.min(b), a.max(b))
    }
}

struct Dial {
    cx: i32,
    cy: i32,
    r: i32,
    k: f64,
    thickness: i32,
    arc_span: f64,
    start_angle: f64,
}

impl Dial {
    fn new(config: &DialConfig) -> Self {
        let (cx, cy) = config.placement.center();
        let k = config.placement.size as f64 / REFERENCE_SIZE;
        let r = (config.placement.size as f64 / 2.0 - config.dial_margin * k) as i32;
        Self {
            cx,
            cy,
            r: r.max(1),
            k,
            thickness: (config.dial_thickness * k).round().max(1.0) as i32,
            arc_span: config.arc_span,
            start_angle: config.start_angle,
        }
    }

    fn angle(&self, pos: f64) -> f64 {
        self.start_angle + self.arc_span * pos
    }
}

#[derive(Debug, Clone)]
struct Needle {
    pos: f64, // Normalized [0,1]
    target_pos: f64,
}

impl Needle {
    fn new() -> Self {
        Self {
            pos: 0.0,
            target_pos: 0.0,
        }
    }

    fn set_target_pos(&mut self, target: f64) {
        self.target_pos = target.clamp(0.0, 1.0);
    }

    fn update_position(&mut self, factor: f64) {
        self.pos = lerp(self.pos, self.target_pos, factor).clamp(0.0, 1.0);
    }
}

fn lerp(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Round single-needle gauge driven by one variable.
pub struct DialGauge {
    config: DialConfig,
    needle: Needle,
    value: Option<f64>,
    raw: Option<i64>,
}

impl DialGauge {
    pub fn new(config: DialConfig) -> Self {
        Self {
            config,
            needle: Needle::new(),
            value: None,
            raw: None,
        }
    }

    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    /// Last value read, in dial units.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn needle_position(&self) -> f64 {
        self.needle.pos
    }

    fn normalize(&self, value: f64) -> f64 {
        let (min, max) = self.config.range;
        if max == min {
            return 0.0;
        }
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    fn is_out_of_range(&self) -> bool {
        let (min, max) = self.config.range;
        self.value.is_some_and(|v| v < min || v > max)
    }

    fn build_scene(&self, ctx: &ApplicationContext) -> Scene {
        let config = &self.config;
        let mut scene = Scene::new();
        let dial = Dial::new(config);
        let (cx, cy) = config.placement.center();
        let face_radius = config.placement.size / 2;

        if ctx.shadows_enabled {
            let offset = (8.0 * dial.k).round() as i32;
            scene.add_command(DrawCommand::Circle {
                cx: cx + offset,
                cy: cy + offset,
                radius: face_radius,
                color: Color::BLACK,
                alpha: 0.5,
            });
        }
        scene.add_command(DrawCommand::Circle {
            cx,
            cy,
            radius: face_radius,
            color: config.face_color,
            alpha: 1.0,
        });

        let out_of_range = self.is_out_of_range();
        let base_color = if out_of_range {
            Color::RED
        } else {
            config.dial_color
        };
        add_dial_with_ticks(&mut scene, &dial, config, base_color);

        scene.add_command(DrawCommand::Text {
            x: cx,
            y: cy + dial.r / 3,
            text: config.name.to_uppercase(),
            font_size: (16.0 * dial.k) as f32,
            color: base_color,
            align: Align::Center,
        });
        if !config.units.is_empty() {
            scene.add_command(DrawCommand::Text {
                x: cx,
                y: cy + dial.r / 2,
                text: config.units.clone(),
                font_size: (13.0 * dial.k) as f32,
                color: base_color,
                align: Align::Center,
            });
        }

        if !ctx.electrics {
            scene.add_command(DrawCommand::Text {
                x: cx,
                y: cy - dial.r / 3,
                text: "OFF".to_string(),
                font_size: (28.0 * dial.k) as f32,
                color: Color::RED,
                align: Align::Center,
            });
        } else if out_of_range {
            scene.add_command(DrawCommand::Text {
                x: cx,
                y: cy - dial.r / 4,
                text: "!".to_string(),
                font_size: (50.0 * dial.k) as f32,
                color: Color::RED,
                align: Align::Center,
            });
        }

        if ctx.tweak {
            let raw = self
                .raw
                .map_or_else(|| "-".to_string(), |raw| raw.to_string());
            scene.add_command(DrawCommand::Text {
                x: config.placement.x,
                y: config.placement.y + config.placement.size + 10,
                text: format!("{:#06X} = {raw}", config.variable.address),
                font_size: 14.0,
                color: Color::new(0x80, 0x80, 0x80),
                align: Align::Left,
            });
        }

        let needle_color = if out_of_range {
            Color::RED
        } else {
            config.needle_color
        };
        add_needle(&mut scene, &dial, self.needle.pos, config, needle_color);
        scene
    }
}

impl Instrument for DialGauge {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn placement(&self) -> Placement {
        self.config.placement
    }

    fn set_placement(&mut self, placement: Placement) {
        self.config.placement = placement;
    }

    fn register(&mut self, vars: &mut dyn VariableBridge) {
        vars.register_variable(self.config.variable.clone());
    }

    fn update(&mut self, _ctx: &ApplicationContext, vars: &mut dyn VariableBridge) {
        let var = &self.config.variable;
        match vars.read(var.address, var.size) {
            Ok(raw) => {
                let raw = raw.as_i64();
                let value = raw as f64 * self.config.scale;
                self.raw = Some(raw);
                self.value = Some(value);
                self.needle.set_target_pos(self.normalize(value));
            }
            // keep showing the last good value
            Err(err) => trace!("{}: {err}", self.config.name),
        }
        self.needle.update_position(self.config.needle_lerp_factor);
    }

    fn render(&self, canvas: &mut Canvas<'_>, ctx: &ApplicationContext) {
        self.build_scene(ctx).render(canvas);
    }
}

fn add_dial_with_ticks(scene: &mut Scene, dial: &Dial, config: &DialConfig, color: Color) {
    let k = dial.k;
    scene.add_command(DrawCommand::Arc {
        cx: dial.cx,
        cy: dial.cy,
        r: dial.r,
        thickness: dial.thickness,
        start_angle: dial.start_angle,
        arc_span: dial.arc_span,
        color,
    });

    let ticks_count = config.ticks_count.max(2);
    let major_length = (config.major_tick_length * k) as i32;
    let minor_length = (config.minor_tick_length * k) as i32;
    for i in 0..ticks_count {
        let t = i as f64 / (ticks_count as f64 - 1.0);
        let angle = dial.angle(t);
        scene.add_command(DrawCommand::Tick {
            cx: dial.cx,
            cy: dial.cy,
            r: dial.r,
            angle,
            length: major_length,
            thickness: config.major_tick_thickness * k as f32,
            color,
        });
        if i < ticks_count - 1 {
            for j in 1..=config.minor_ticks_per_interval {
                let minor_t = t + j as f64
                    / ((config.minor_ticks_per_interval + 1) as f64 * (ticks_count as f64 - 1.0));
                scene.add_command(DrawCommand::Tick {
                    cx: dial.cx,
                    cy: dial.cy,
                    r: dial.r,
                    angle: dial.angle(minor_t),
                    length: minor_length,
                    thickness: config.minor_tick_thickness * k as f32,
                    color,
                });
            }
        }
        let label_radius =
            dial.r as f64 - major_length as f64 - config.ticks_to_numbers_distance * k;
        let (range_min, range_max) = config.range;
        scene.add_command(DrawCommand::Text {
            x: (dial.cx as f64 + angle.cos() * label_radius) as i32,
            y: (dial.cy as f64 + angle.sin() * label_radius) as i32,
            text: format!("{}", (range_min + t * (range_max - range_min)).round() as i64),
            font_size: config.numbers_font_size * k as f32,
            color,
            align: Align::Center,
        });
    }
}

fn add_needle(scene: &mut Scene, dial: &Dial, pos: f64, config: &DialConfig, color: Color) {
    let angle = dial.angle(pos);
    let length = dial.r as f64 * config.needle_length_factor;
    let back_length = config.needle_back_length * dial.k;
    let width = config.needle_width * dial.k as f32;
    let (nx, ny) = (
        (dial.cx as f64 + angle.cos() * length) as i32,
        (dial.cy as f64 + angle.sin() * length) as i32,
    );
    let (back_x, back_y) = (
        (dial.cx as f64 - angle.cos() * back_length) as i32,
        (dial.cy as f64 - angle.sin() * back_length) as i32,
    );
    scene.add_command(DrawCommand::Line {
        x0: dial.cx,
        y0: dial.cy,
        x1: nx,
        y1: ny,
        thickness: width,
        tapered: true,
        color,
    });
    scene.add_command(DrawCommand::Line {
        x0: dial.cx,
        y0: dial.cy,
        x1: back_x,
        y1: back_y,
        thickness: width,
        tapered: false,
        color,
    });
    scene.add_command(DrawCommand::Circle {
        cx: dial.cx,
        cy: dial.cy,
        radius: (config.dot_radius * dial.k).round() as i32,
        color,
        alpha: 1.0,
    });
}
