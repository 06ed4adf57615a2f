use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use eframe::egui;
use eframe::egui::epaint::CubicBezierShape;
use serde::Deserialize;

use flowline::color::palette_color;
use flowline::interact::Session;
use flowline::layout::{DEFAULT_NODE_PADDING, DEFAULT_NODE_WIDTH};
use flowline::{
    layout, Align, ElementKey, Graph, LayoutOptions, Link, Node, SankeyGraph, SankeyLink,
    SankeyNode,
};

/// Interactive Sankey flow-diagram viewer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with {"nodes": [...], "links": [...]}; built-in sample data
    /// when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Column tie-break policy for under-constrained nodes.
    #[arg(long, value_enum, default_value_t = AlignArg::Justify)]
    align: AlignArg,
    /// Node band thickness in pixels.
    #[arg(long, default_value_t = DEFAULT_NODE_WIDTH)]
    node_width: f64,
    /// Minimum vertical gap between stacked nodes in pixels.
    #[arg(long, default_value_t = DEFAULT_NODE_PADDING)]
    node_padding: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AlignArg {
    Left,
    Right,
    Center,
    Justify,
}

impl From<AlignArg> for Align {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Left => Align::Left,
            AlignArg::Right => Align::Right,
            AlignArg::Center => Align::Center,
            AlignArg::Justify => Align::Justify,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
struct NodeExtra {
    /// Drawn beside the band; the id stands in when missing.
    #[serde(default)]
    label: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
struct LinkExtra {
    /// `#rrggbb` ribbon override; ribbons take the source node's color when
    /// missing.
    #[serde(default)]
    color: Option<String>,
}

type Input = Graph<NodeExtra, LinkExtra>;
type Diagram = SankeyGraph<NodeExtra, LinkExtra>;

fn main() -> Result<()> {
    let args = Args::parse();
    let input = load_graph(&args)?;
    let options = LayoutOptions {
        align: args.align.into(),
        node_width: args.node_width,
        node_padding: args.node_padding,
        ..LayoutOptions::default()
    };
    // surface structural problems before a window ever opens
    layout(input.clone(), 1280.0, 800.0, &options).context("laying out the input graph")?;

    let native = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "flowline",
        native,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(input, options)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))?;
    Ok(())
}

fn load_graph(args: &Args) -> Result<Input> {
    let Some(path) = &args.data else {
        return Ok(sample_graph());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let graph =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(graph)
}

/// Energy-flow style demo data: generation sources feeding carriers feeding
/// consumers.
fn sample_graph() -> Input {
    let nodes = [
        "Coal",
        "Gas",
        "Wind",
        "Solar",
        "Electricity",
        "Heating",
        "Industry",
        "Homes",
    ]
    .into_iter()
    .map(|name| Node::new(name, NodeExtra::default()))
    .collect();

    let links = [
        ("Coal", "Electricity", 32.0),
        ("Gas", "Electricity", 22.0),
        ("Wind", "Electricity", 14.0),
        ("Solar", "Electricity", 8.0),
        ("Gas", "Heating", 18.0),
        ("Coal", "Industry", 6.0),
        ("Electricity", "Industry", 40.0),
        ("Electricity", "Homes", 28.0),
        ("Heating", "Homes", 18.0),
    ]
    .into_iter()
    .map(|(source, target, value)| Link::new(source, target, value, LinkExtra::default()))
    .collect();

    Graph { nodes, links }
}

const RIBBON_SAMPLES: usize = 24;
const LABEL_GAP: f32 = 6.0;

enum Hit {
    Node(usize),
    Link(usize),
}

struct ViewerApp {
    input: Input,
    options: LayoutOptions<NodeExtra, LinkExtra>,
    diagram: Diagram,
    session: Session,
    surface: egui::Vec2,
}

impl ViewerApp {
    fn new(input: Input, options: LayoutOptions<NodeExtra, LinkExtra>) -> Self {
        let diagram = Diagram::default();
        let session = Session::new(&diagram);
        Self {
            input,
            options,
            diagram,
            session,
            surface: egui::Vec2::ZERO,
        }
    }

    /// Recomputes the layout for a new canvas size and rebinds the session.
    fn relayout(&mut self, size: egui::Vec2) {
        self.surface = size;
        match layout(self.input.clone(), size.x as f64, size.y as f64, &self.options) {
            Ok(diagram) => {
                self.diagram = diagram;
                self.session.rebind(&self.diagram);
            }
            Err(err) => log::error!("layout failed: {err}"),
        }
    }

    fn hit_test(&self, pos: egui::Pos2) -> Option<Hit> {
        // node bands sit on top of the ribbons
        for node in &self.diagram.nodes {
            if node_rect(node).contains(pos) {
                return Some(Hit::Node(node.index));
            }
        }

        self.diagram
            .links
            .iter()
            .filter(|link| link.width > 0.0)
            .map(|link| {
                let points = ribbon_points(&self.diagram, link);
                let distance = (0..=RIBBON_SAMPLES)
                    .map(|i| bezier_point(&points, i as f32 / RIBBON_SAMPLES as f32).distance(pos))
                    .fold(f32::INFINITY, f32::min);
                (link.index, distance - link.width as f32 / 2.0)
            })
            .filter(|&(_, slack)| slack <= 1.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| Hit::Link(index))
    }

    fn paint(&self, painter: &egui::Painter, origin: egui::Vec2) {
        for link in &self.diagram.links {
            if link.width <= 0.0 {
                continue;
            }
            let opacity = self.session.opacity(&self.diagram.link_key(link)) as f32;
            let color = link
                .payload
                .color
                .as_deref()
                .map(hex_color)
                .unwrap_or_else(|| node_color(&self.diagram.nodes[link.source]));
            let points = ribbon_points(&self.diagram, link).map(|p| p + origin);
            painter.add(CubicBezierShape::from_points_stroke(
                points,
                false,
                egui::Color32::TRANSPARENT,
                egui::Stroke::new(link.width as f32, with_opacity(color, opacity * 0.6)),
            ));
        }

        let half = self.surface.x / 2.0;
        for node in &self.diagram.nodes {
            let opacity = self.session.opacity(&node.key()) as f32;
            let rect = node_rect(node).translate(origin);
            painter.rect_filled(rect, 2.0, with_opacity(node_color(node), opacity));

            let label = node
                .payload
                .label
                .clone()
                .unwrap_or_else(|| node.id.to_string());
            let (pos, anchor) = if rect.center().x - origin.x > half {
                (
                    egui::pos2(rect.left() - LABEL_GAP, rect.center().y),
                    egui::Align2::RIGHT_CENTER,
                )
            } else {
                (
                    egui::pos2(rect.right() + LABEL_GAP, rect.center().y),
                    egui::Align2::LEFT_CENTER,
                )
            };
            painter.text(
                pos,
                anchor,
                label,
                egui::FontId::proportional(12.0),
                egui::Color32::from_gray(200),
            );
        }

        if self.session.tooltip_visible() {
            if let Some(key) = self.session.tooltip_payload() {
                let (x, y) = self.session.tooltip_position();
                let pos = egui::pos2(x as f32, y as f32) + origin + egui::vec2(14.0, 14.0);
                let galley = painter.layout_no_wrap(
                    self.tooltip_text(key),
                    egui::FontId::proportional(12.0),
                    egui::Color32::WHITE,
                );
                let frame = egui::Rect::from_min_size(pos, galley.size()).expand(6.0);
                painter.rect_filled(frame, 4.0, egui::Color32::from_black_alpha(200));
                painter.galley(pos, galley, egui::Color32::WHITE);
            }
        }
    }

    fn tooltip_text(&self, key: &ElementKey) -> String {
        match key {
            ElementKey::Node(id) => match self.diagram.node_by_id(id) {
                Some(node) => {
                    let name = node
                        .payload
                        .label
                        .clone()
                        .unwrap_or_else(|| node.id.to_string());
                    format!("{name}\nthroughput {:.1}", node.value)
                }
                None => id.to_string(),
            },
            ElementKey::Link(source, target) => {
                let value = self
                    .diagram
                    .links
                    .iter()
                    .find(|link| {
                        self.diagram.nodes[link.source].id == *source
                            && self.diagram.nodes[link.target].id == *target
                    })
                    .map(|link| link.value);
                match value {
                    Some(value) => format!("{source} → {target}\nflow {value:.1}"),
                    None => format!("{source} → {target}"),
                }
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            if (rect.size() - self.surface).length() > 0.5 {
                self.relayout(rect.size());
            }

            if let Some(pos) = response.hover_pos() {
                let local = (pos - rect.min).to_pos2();
                self.session.move_pointer(local.x as f64, local.y as f64);
                match self.hit_test(local) {
                    Some(Hit::Node(index)) => {
                        let id = self.diagram.nodes[index].id.clone();
                        self.session.hover_node(&id);
                        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    Some(Hit::Link(index)) => {
                        let link = &self.diagram.links[index];
                        let source = self.diagram.nodes[link.source].id.clone();
                        let target = self.diagram.nodes[link.target].id.clone();
                        self.session.hover_link(&source, &target);
                        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    None => self.session.clear_hover(),
                }
            } else {
                self.session.clear_hover();
            }

            let painter = ui.painter_at(rect);
            self.paint(&painter, rect.min.to_vec2());

            let now = ctx.input(|i| i.time);
            if self.session.tick(now) {
                ctx.request_repaint();
            }
        });
    }
}

fn node_rect(node: &SankeyNode<NodeExtra>) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(node.x0 as f32, node.y0 as f32),
        egui::pos2(node.x1 as f32, node.y1 as f32),
    )
}

fn node_color(node: &SankeyNode<NodeExtra>) -> egui::Color32 {
    hex_color(palette_color(node.index))
}

/// Ribbon control points: endpoints at the node edges, handles pulled to the
/// horizontal midpoint.
fn ribbon_points(diagram: &Diagram, link: &SankeyLink<LinkExtra>) -> [egui::Pos2; 4] {
    let source = &diagram.nodes[link.source];
    let target = &diagram.nodes[link.target];
    let from = egui::pos2(source.x1 as f32, link.y0 as f32);
    let to = egui::pos2(target.x0 as f32, link.y1 as f32);
    let mid = (from.x + to.x) / 2.0;
    [from, egui::pos2(mid, from.y), egui::pos2(mid, to.y), to]
}

fn bezier_point(points: &[egui::Pos2; 4], t: f32) -> egui::Pos2 {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    egui::pos2(
        w0 * points[0].x + w1 * points[1].x + w2 * points[2].x + w3 * points[3].x,
        w0 * points[0].y + w1 * points[1].y + w2 * points[2].y + w3 * points[3].y,
    )
}

fn with_opacity(color: egui::Color32, opacity: f32) -> egui::Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn hex_color(hex: &str) -> egui::Color32 {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return egui::Color32::GRAY;
    }
    let channel =
        |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0x80);
    egui::Color32::from_rgb(channel(0..2), channel(2..4), channel(4..6))
}
