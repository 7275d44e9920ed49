use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use crate::{
    config::{
        A4_PAPER, GROUP_FILL, HEADER_FILL, SHEET_NAME, STRIPE_FILL, THICK_BORDER, THIN_BORDER,
        TITLE_FILL,
    },
    error::Result,
    layout::{CellRole, LayoutCell, SheetLayout, DATA_START, NAME_COLUMNS},
    types::CellValue,
};

fn cell_format(cell: &LayoutCell, header_rotation: i16) -> Format {
    let mut format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(THIN_BORDER));

    format = match cell.role {
        CellRole::Title => format
            .set_bold()
            .set_font_size(13)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_background_color(Color::RGB(TITLE_FILL)),
        CellRole::Group => format
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_background_color(Color::RGB(GROUP_FILL)),
        CellRole::Header => format
            .set_bold()
            .set_rotation(header_rotation)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::Bottom)
            .set_text_wrap()
            .set_background_color(Color::RGB(HEADER_FILL)),
        CellRole::Name => format
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter),
        CellRole::Data => format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap(),
    };

    if cell.role == CellRole::Data && matches!(cell.value, CellValue::Number(_)) {
        format = format.set_num_format("0.00");
    }
    if cell.striped {
        format = format.set_background_color(Color::RGB(STRIPE_FILL));
    }
    if cell.section_end {
        format = format
            .set_border_right(FormatBorder::Medium)
            .set_border_right_color(Color::RGB(THICK_BORDER));
    }
    format
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &LayoutCell, format: &Format) -> Result<()> {
    match &cell.value {
        CellValue::Number(n) if !n.is_nan() => {
            sheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) => {
            sheet.write_string_with_format(row, col, s, format)?;
        }
        _ => {
            sheet.write_blank(row, col, format)?;
        }
    }
    Ok(())
}

pub fn render_sheet(sheet: &mut Worksheet, layout: &SheetLayout) -> Result<()> {
    sheet.set_name(SHEET_NAME)?;

    for merged in layout.merges.iter() {
        let format = cell_format(&merged.cell, layout.header_rotation);
        sheet.merge_range(
            merged.row,
            merged.first_col,
            merged.row,
            merged.last_col,
            &merged.cell.value.to_string(),
            &format,
        )?;
    }
    for (&(row, col), cell) in layout.cells.iter() {
        write_cell(sheet, row, col, cell, &cell_format(cell, layout.header_rotation))?;
    }

    for (col, width) in layout.column_widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    for (&row, &height) in layout.row_heights.iter() {
        sheet.set_row_height(row, height)?;
    }

    sheet.set_freeze_panes(DATA_START, NAME_COLUMNS)?;
    sheet
        .set_landscape()
        .set_paper_size(A4_PAPER)
        .set_print_fit_to_pages(1, 1)
        .set_print_center_horizontally(true);
    Ok(())
}

pub fn write_workbook(layout: &SheetLayout, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    render_sheet(sheet, layout)?;
    workbook.save(output_path)?;
    debug!(
        "Saved {} rows x {} columns to {}",
        layout.last_row + 1,
        layout.last_col + 1,
        output_path.display()
    );
    Ok(())
}
