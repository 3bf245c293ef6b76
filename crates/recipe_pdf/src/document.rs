use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use recipe_core::{DocumentRenderer, RenderError};
use shared::domain::{Cell, CellId, MiniBoxPosition, RecipeSnapshot, GRID_SIZE};
use tracing::debug;

use crate::text::{pdf_safe, wrap};

/// A4 portrait.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;

const CELL_PITCH_MM: f32 = 34.0;
const CELL_SIZE_MM: f32 = 22.0;
const MINI_BOX_SIZE_MM: f32 = 8.0;
const MINI_BOX_GAP_MM: f32 = 1.5;

const TITLE_FONT_SIZE: f32 = 20.0;
const META_FONT_SIZE: f32 = 10.0;
const HEADING_FONT_SIZE: f32 = 12.0;
const LABEL_FONT_SIZE: f32 = 8.0;
const SMALL_FONT_SIZE: f32 = 6.0;
const MINI_FONT_SIZE: f32 = 4.5;
const NOTES_FONT_SIZE: f32 = 10.0;

const NOTES_LINE_HEIGHT_MM: f32 = 5.0;
const NOTES_WRAP_CHARS: usize = 95;
const LABEL_WRAP_CHARS: usize = 14;
const LABEL_MAX_LINES: usize = 3;
const MINI_LABEL_CHARS: usize = 7;

/// Lays out a recipe snapshot as a printable PDF: header, grid and notes.
#[derive(Debug, Clone, Default)]
pub struct PdfRecipeRenderer;

impl PdfRecipeRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_bytes(&self, snapshot: &RecipeSnapshot) -> Result<Vec<u8>, RenderError> {
        let title = pdf_safe(snapshot.info.display_name());
        let (doc, page, layer) = PdfDocument::new(
            title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Recipe",
        );
        let fonts = Fonts::load(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        y = draw_header(&layer, &fonts, snapshot, y);
        y = draw_grid(&layer, &fonts, snapshot, y);
        draw_notes(&doc, layer, &fonts, &snapshot.notes, y);

        let bytes = doc
            .save_to_bytes()
            .map_err(|err| RenderError::new(err.to_string()))?;
        debug!(size_bytes = bytes.len(), "rendered recipe document");
        Ok(bytes)
    }
}

impl DocumentRenderer for PdfRecipeRenderer {
    fn render(&self, snapshot: &RecipeSnapshot) -> Result<Vec<u8>, RenderError> {
        self.render_bytes(snapshot)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        let load = |font| {
            doc.add_builtin_font(font)
                .map_err(|err| RenderError::new(format!("failed to load font: {err}")))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }
}

fn draw_header(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    snapshot: &RecipeSnapshot,
    top: f32,
) -> f32 {
    let info = &snapshot.info;
    let mut y = top - 7.0;
    layer.use_text(
        pdf_safe(info.display_name()),
        TITLE_FONT_SIZE,
        Mm(MARGIN_MM),
        Mm(y),
        &fonts.bold,
    );

    let details: Vec<String> = [
        ("By", info.author.trim()),
        ("Cook time", info.cook_time.trim()),
        ("Date", info.date.trim()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {}", pdf_safe(value)))
    .collect();
    if !details.is_empty() {
        y -= 7.0;
        layer.use_text(
            details.join("   |   "),
            META_FONT_SIZE,
            Mm(MARGIN_MM),
            Mm(y),
            &fonts.regular,
        );
    }

    y -= 4.0;
    set_stroke(layer, 0.6, 0.3);
    draw_line(layer, MARGIN_MM, y, PAGE_WIDTH_MM - MARGIN_MM, y);
    y - 6.0
}

/// Draws the 5×5 grid below `top` and returns the y coordinate under it.
fn draw_grid(layer: &PdfLayerReference, fonts: &Fonts, snapshot: &RecipeSnapshot, top: f32) -> f32 {
    let grid_width = CELL_PITCH_MM * f32::from(GRID_SIZE);
    let origin_x = (PAGE_WIDTH_MM - grid_width) / 2.0;

    for id in CellId::all() {
        let slot_x = origin_x + CELL_PITCH_MM * f32::from(id.col());
        let slot_top = top - CELL_PITCH_MM * f32::from(id.row());
        let x = slot_x + (CELL_PITCH_MM - CELL_SIZE_MM) / 2.0 - MINI_BOX_SIZE_MM / 4.0;
        let y = slot_top - (CELL_PITCH_MM - CELL_SIZE_MM) / 2.0 - CELL_SIZE_MM;

        match snapshot.cell(id) {
            Some(cell) if !cell.is_empty() => draw_cell(layer, fonts, cell, x, y),
            _ => {
                set_stroke(layer, 0.85, 0.2);
                draw_rect(layer, x, y, CELL_SIZE_MM, CELL_SIZE_MM);
            }
        }
    }

    top - CELL_PITCH_MM * f32::from(GRID_SIZE) - 4.0
}

fn draw_cell(layer: &PdfLayerReference, fonts: &Fonts, cell: &Cell, x: f32, y: f32) {
    set_stroke(layer, 0.0, 0.6);
    draw_rect(layer, x, y, CELL_SIZE_MM, CELL_SIZE_MM);

    let mut label_lines = wrap(&pdf_safe(&cell.current_label), LABEL_WRAP_CHARS);
    label_lines.truncate(LABEL_MAX_LINES);
    let mut text_y = y + CELL_SIZE_MM - 6.0;
    for line in label_lines {
        layer.use_text(line, LABEL_FONT_SIZE, Mm(x + 1.5), Mm(text_y), &fonts.bold);
        text_y -= 3.5;
    }

    if cell.is_renamed() {
        let mut original = pdf_safe(&cell.original_label);
        if original.chars().count() > LABEL_WRAP_CHARS + 2 {
            original = original.chars().take(LABEL_WRAP_CHARS + 1).collect::<String>() + ".";
        }
        layer.use_text(
            format!("({original})"),
            SMALL_FONT_SIZE,
            Mm(x + 1.5),
            Mm(y + 2.0),
            &fonts.italic,
        );
    }

    for mini_box in &cell.mini_boxes {
        let (mx, my) = mini_box_origin(mini_box.position, x, y);
        set_stroke(layer, 0.25, 0.4);
        draw_rect(layer, mx, my, MINI_BOX_SIZE_MM, MINI_BOX_SIZE_MM);
        if let Some(action) = &mini_box.action {
            let short: String = pdf_safe(&action.name)
                .chars()
                .take(MINI_LABEL_CHARS)
                .collect();
            layer.use_text(
                short,
                MINI_FONT_SIZE,
                Mm(mx + 0.6),
                Mm(my + MINI_BOX_SIZE_MM / 2.0 - 0.8),
                &fonts.regular,
            );
        }
    }
}

fn mini_box_origin(position: MiniBoxPosition, cell_x: f32, cell_y: f32) -> (f32, f32) {
    let centered_x = cell_x + (CELL_SIZE_MM - MINI_BOX_SIZE_MM) / 2.0;
    match position {
        MiniBoxPosition::Right => (
            cell_x + CELL_SIZE_MM + MINI_BOX_GAP_MM,
            cell_y + (CELL_SIZE_MM - MINI_BOX_SIZE_MM) / 2.0,
        ),
        MiniBoxPosition::Top => (centered_x, cell_y + CELL_SIZE_MM + MINI_BOX_GAP_MM),
        MiniBoxPosition::Bottom => (
            centered_x,
            cell_y - MINI_BOX_SIZE_MM - MINI_BOX_GAP_MM,
        ),
    }
}

/// Writes the notes under `top`, continuing on new pages as needed.
fn draw_notes(
    doc: &PdfDocumentReference,
    mut layer: PdfLayerReference,
    fonts: &Fonts,
    notes: &str,
    top: f32,
) {
    if notes.trim().is_empty() {
        return;
    }

    let mut y = top - 4.0;
    layer.use_text("Notes", HEADING_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &fonts.bold);
    y -= NOTES_LINE_HEIGHT_MM + 1.0;

    for paragraph in notes.lines() {
        let lines = wrap(&pdf_safe(paragraph), NOTES_WRAP_CHARS);
        if lines.is_empty() {
            y -= NOTES_LINE_HEIGHT_MM;
            continue;
        }
        for line in lines {
            if y < MARGIN_MM {
                let (page, page_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Notes");
                layer = doc.get_page(page).get_layer(page_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            layer.use_text(line, NOTES_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &fonts.regular);
            y -= NOTES_LINE_HEIGHT_MM;
        }
    }
}

fn set_stroke(layer: &PdfLayerReference, gray: f32, thickness: f32) {
    layer.set_outline_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
    layer.set_outline_thickness(thickness);
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    });
}

fn draw_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ],
        is_closed: true,
    });
}
