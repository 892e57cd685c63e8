//! dot_probe — step a dot field from the terminal and look at it as ASCII.

use std::io::{self, Write};

use dot_field::{
    Canvas, DotField, FieldConfig, Gesture, InfluencePoint, InputSnapshot, Rgba, Transform, Variant,
};
use glam::Vec2;

/// Terminal cells across the rendered field.
const COLS: usize = 72;

/// Darkest → brightest by relative dot size.
const RAMP: &[u8] = b" .:-=+*#%@";

// ════════════════════════════════════════════════════════════════════════════
// AsciiCanvas
// ════════════════════════════════════════════════════════════════════════════

/// Each cell keeps the largest dot that landed in it.
struct AsciiCanvas {
    cols:   usize,
    rows:   usize,
    cell:   Vec2,
    max:    f32,
    cells:  Vec<f32>,
}

impl AsciiCanvas {
    fn new(width: f32, height: f32, max_diameter: f32) -> Self {
        let cols = COLS;
        // Terminal cells are about twice as tall as wide.
        let rows = ((height / width) * cols as f32 / 2.0).ceil().max(1.0) as usize;
        AsciiCanvas {
            cols,
            rows,
            cell:  Vec2::new(width / cols as f32, height / rows as f32),
            max:   max_diameter.max(1.0),
            cells: vec![0.0; cols * rows],
        }
    }

    fn index(&self, p: Vec2) -> Option<usize> {
        let c = (p.x / self.cell.x).floor();
        let r = (p.y / self.cell.y).floor();
        if c < 0.0 || r < 0.0 || c >= self.cols as f32 || r >= self.rows as f32 {
            return None;
        }
        Some(r as usize * self.cols + c as usize)
    }

    fn print(&self) {
        println!("  +{}+", "-".repeat(self.cols));
        for row in self.cells.chunks(self.cols) {
            let line: String = row
                .iter()
                .map(|&d| {
                    if d <= 0.0 {
                        ' '
                    } else {
                        let t = (d / self.max).clamp(0.0, 1.0);
                        let i = 1 + (t * (RAMP.len() - 2) as f32).round() as usize;
                        RAMP[i.min(RAMP.len() - 1)] as char
                    }
                })
                .collect();
            println!("  |{}|", line);
        }
        println!("  +{}+", "-".repeat(self.cols));
    }
}

impl Canvas for AsciiCanvas {
    fn fill_circle(&mut self, center: Vec2, diameter: f32, color: Rgba) {
        if color.a <= 0.0 {
            return;
        }
        if let Some(i) = self.index(center) {
            self.cells[i] = self.cells[i].max(diameter);
        }
    }

    fn line(&mut self, _from: Vec2, _to: Vec2, _color: Rgba) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Main loop
// ════════════════════════════════════════════════════════════════════════════

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          dot_probe — spring-damper dot field explorer        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let variant = pick_variant();
    let (w, h) = variant.canvas_size();
    let mut field = match DotField::new(FieldConfig::for_variant(variant), w as f32, h as f32) {
        Ok(f) => f,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut points: Vec<InfluencePoint> = Vec::new();
    let mut level: Option<f32> = None;

    print_help();
    show(&field, &points, level);

    loop {
        let line = read_line("dot> ");
        if line.is_empty() {
            // EOF
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["q"] | ["quit"] => break,
            ["?"] | ["help"] => print_help(),
            ["s"] => step(&mut field, &points, level, 1),
            ["s", n] => step(&mut field, &points, level, n.parse().unwrap_or(1)),
            ["p", x, y] => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => {
                    points.retain(|p| p.id != dot_field::input::POINTER_ID);
                    points.push(InfluencePoint::pointer(Vec2::new(x, y)));
                }
                _ => println!("  ⚠  p X Y"),
            },
            ["h", id, x, y, label] => match (id.parse::<u32>(), x.parse(), y.parse()) {
                (Ok(id), Ok(x), Ok(y)) => {
                    points.retain(|p| p.id != id);
                    points.push(InfluencePoint {
                        id,
                        position: Vec2::new(x, y),
                        gesture:  Gesture::from_label(label),
                    });
                }
                _ => println!("  ⚠  h ID X Y GESTURE"),
            },
            ["c"] => points.clear(),
            ["l", v] => level = v.parse().ok(),
            ["l"] => level = None,
            ["k", x, y] => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => field.trigger_shockwave(Vec2::new(x, y)),
                _ => println!("  ⚠  k X Y"),
            },
            ["w"] => {
                match field.cycle_wipe() {
                    Some(c) => println!("  wipe → {}", c),
                    None    => println!("  ⚠  this sketch does not wipe"),
                }
            }
            ["r"] => field.reset(),
            ["size", x, y] => match (x.parse(), y.parse()) {
                (Ok(x), Ok(y)) => field.resize(x, y),
                _ => println!("  ⚠  size W H"),
            },
            _ => println!("  ⚠  unknown command (? for help)"),
        }
        show(&field, &points, level);
    }
}

fn step(field: &mut DotField, points: &[InfluencePoint], level: Option<f32>, n: u32) {
    let input = InputSnapshot { points: points.to_vec(), audio_level: None }.with_level(level);
    for _ in 0..n {
        field.step(&input);
    }
}

fn show(field: &DotField, points: &[InfluencePoint], level: Option<f32>) {
    let (w, h) = field.size();
    let mut canvas = AsciiCanvas::new(w, h, field.config().max_diameter);
    field.render(&mut canvas, &Transform::IDENTITY);
    canvas.print();
    println!(
        "  frame {}  dots {}  radius {:.0}  mean disp {:.2}  shock {:.2}  pending {}",
        field.frame(),
        field.particles().len(),
        field.radius(),
        field.mean_displacement(),
        field.shockwave().strength,
        field.pending_events(),
    );
    for p in points {
        println!("  · point {} at ({:.0}, {:.0}) {}", p.id, p.position.x, p.position.y, p.gesture.label());
    }
    if let Some(l) = level {
        println!("  · level {:.2}", l);
    }
}

fn pick_variant() -> Variant {
    let all = Variant::all();
    let names: Vec<String> = all.iter().enumerate().map(|(i, v)| format!("{}.{}", i + 1, v.name())).collect();
    println!("  {}", names.join("  "));
    let choice = read_line("  Variant (1–9 or name, default spring): ");
    let choice = choice.trim();
    if let Ok(n) = choice.parse::<usize>() {
        if let Some(v) = all.get(n.wrapping_sub(1)) {
            return *v;
        }
    }
    Variant::from_name(choice).unwrap_or(Variant::Spring)
}

fn print_help() {
    println!();
    println!("  s [N]              step N frames (default 1)");
    println!("  p X Y              move the pointer");
    println!("  h ID X Y GESTURE   place a hand (open, fist, pointing, 0–5)");
    println!("  c                  clear all points");
    println!("  l [LEVEL]          set / clear the audio level");
    println!("  k X Y              fire a shockwave");
    println!("  w                  start a color wipe");
    println!("  size W H           resize the canvas");
    println!("  r                  rebuild the field");
    println!("  q                  quit");
    println!();
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
