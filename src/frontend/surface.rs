//! egui painter as a heatmap [`Surface`]

use crate::matrix::{DrawOp, Scene, Surface};
use egui::{epaint::Mesh, FontId, Painter, Rect, Sense, Shape, Ui, Vec2};

/// A rectangle of the current UI, painted with the UI's painter
pub struct EguiSurface {
    painter: Painter,
    rect: Rect,
    pixels_per_point: f32,
}

impl EguiSurface {
    /// Reserve `size` logical points in `ui`
    pub fn allocate(ui: &mut Ui, size: Vec2) -> Self {
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        Self {
            painter: ui.painter_at(rect),
            rect,
            pixels_per_point: ui.ctx().pixels_per_point(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

fn gradient(rect: Rect, from: egui::Color32, to: egui::Color32) -> Shape {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), from);
    mesh.colored_vertex(rect.right_top(), to);
    mesh.colored_vertex(rect.right_bottom(), to);
    mesh.colored_vertex(rect.left_bottom(), from);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    Shape::mesh(mesh)
}

impl Surface for EguiSurface {
    fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    fn logical_size(&self) -> Vec2 {
        self.rect.size()
    }

    fn draw(&mut self, scene: &Scene) {
        let offset = self.rect.min.to_vec2();
        for op in &scene.ops {
            match op {
                DrawOp::Fill { rect, color } => {
                    self.painter.rect_filled(rect.translate(offset), 0.0, *color);
                }
                DrawOp::Gradient { rect, from, to } => {
                    self.painter.add(gradient(rect.translate(offset), *from, *to));
                }
                DrawOp::Text {
                    pos,
                    anchor,
                    text,
                    size,
                    color,
                } => {
                    self.painter.text(
                        *pos + offset,
                        *anchor,
                        text,
                        FontId::proportional(*size),
                        *color,
                    );
                }
            }
        }
    }
}
