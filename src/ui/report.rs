use crate::error::Result;
use crate::models::{readable_stage, AgronomicSummary};
use crate::ui::Theme;
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
    Terminal, TerminalOptions, Viewport,
};
use std::io::{self, IsTerminal};

const REPORT_WIDTH: u16 = 72;
const BAR_WIDTH: usize = 25;
/// Bars never scale below this many mm, so tiny balances stay tiny.
const MIN_SCALE_MM: f64 = 10.0;

/// The irrigation decision for one field, as a single framed report.
pub struct ReportWidget<'a> {
    summary: &'a AgronomicSummary,
}

impl<'a> ReportWidget<'a> {
    pub fn new(summary: &'a AgronomicSummary) -> Self {
        Self { summary }
    }

    fn footer_height(&self) -> u16 {
        if self.summary.irrigation_required {
            7
        } else {
            3
        }
    }

    /// Rows needed to draw the whole report.
    pub fn height(&self) -> u16 {
        // borders + decision + context + rule + chart title + chart + gap + footer
        2 + 3 + 4 + 1 + 1 + 3 + 1 + self.footer_height()
    }
}

impl Widget for ReportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(" AGRIWATER COMPLETE REPORT ", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Decision
                Constraint::Length(4), // Context
                Constraint::Length(1), // Rule
                Constraint::Length(1), // Chart title
                Constraint::Length(3), // Chart
                Constraint::Length(1),
                Constraint::Min(self.footer_height()),
            ])
            .split(inner);

        self.render_decision(chunks[0], buf);
        self.render_context(chunks[1], buf);

        let rule = "─".repeat(inner.width.saturating_sub(8) as usize);
        Paragraph::new(Span::styled(rule, Theme::dim()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        Paragraph::new(Span::styled("WATER BALANCE", Theme::header()))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        self.render_chart(chunks[4], buf);
        self.render_footer(chunks[6], buf);
    }
}

impl ReportWidget<'_> {
    fn render_decision(&self, area: Rect, buf: &mut Buffer) {
        let text = if self.summary.irrigation_required {
            " IRRIGATION REQUIRED "
        } else {
            " NO IRRIGATION NEEDED "
        };

        let banner = centered(area, 40);
        let block = Block::default()
            .title(Span::styled("Decision Support", Theme::title()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(banner);
        block.render(banner, buf);

        Paragraph::new(Span::styled(
            text,
            Theme::decision(self.summary.irrigation_required),
        ))
        .alignment(Alignment::Center)
        .render(inner, buf);
    }

    fn render_context(&self, area: Rect, buf: &mut Buffer) {
        let s = self.summary;
        let rows = [
            (
                "Crop:",
                format!(
                    "{} ({})",
                    readable_stage(&s.crop_name),
                    readable_stage(&s.crop_stage)
                ),
            ),
            ("Area:", format!("{:.1} ha", s.surface_ha)),
            ("Period:", format!("Last {} days", s.period_days)),
            ("Efficiency:", format!("{:.0}%", s.efficiency * 100.0)),
        ];

        let rows: Vec<Row> = rows
            .into_iter()
            .map(|(label, value)| {
                Row::new(vec![
                    Cell::from(Line::from(label).alignment(Alignment::Right))
                        .style(Theme::label()),
                    Cell::from(value).style(Theme::normal()),
                ])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(11), Constraint::Length(28)])
            .column_spacing(2);
        table.render(centered(area, 41), buf);
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        let s = self.summary;
        let scale = s
            .total_etc_mm
            .max(s.total_precip_mm)
            .max(s.recommended_mm)
            .max(MIN_SCALE_MM);

        let lines: Vec<Line> = [
            ("Crop Demand", s.total_etc_mm),
            ("Net Rainfall", s.total_precip_mm),
            ("Water Need", s.recommended_mm),
        ]
        .into_iter()
        .map(|(label, value)| {
            let filled = bar_fill(value, scale, BAR_WIDTH);
            Line::from(vec![
                Span::styled(format!("{:>15} ", label), Theme::header()),
                Span::styled("█".repeat(filled), Theme::bar_filled()),
                Span::styled("░".repeat(BAR_WIDTH - filled), Theme::bar_track()),
                Span::styled(format!(" {:>7.1} mm", value), Theme::normal()),
            ])
        })
        .collect();

        Paragraph::new(lines).render(centered(area, 52), buf);
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let s = self.summary;
        let style = Theme::verdict(s.irrigation_required);
        let heading = style.add_modifier(ratatui::style::Modifier::BOLD);

        let mut lines = vec![Line::from(Span::styled("STATUS", heading))];
        if s.irrigation_required {
            lines.push(Line::from(Span::styled(
                format!("Water balance is negative ({:.1} mm).", s.water_balance_mm),
                style,
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "Precipitation over the last {} days does not cover crop needs.",
                    s.period_days
                ),
                style,
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("RECOMMENDATION", heading)));
            lines.push(Line::from(Span::styled(
                format!(
                    "Recommended application rate: {:.0} m³ per hectare.",
                    s.recommended_m3_per_ha
                ),
                style,
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "Total volume required for this field: {:.0} m³.",
                    s.recommended_total_m3
                ),
                style,
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("Water balance is positive (+{:.1} mm).", s.water_balance_mm),
                style,
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "Precipitation over the last {} days covers crop needs.",
                    s.period_days
                ),
                style,
            )));
        }

        Paragraph::new(lines).render(centered(area, 66), buf);
    }
}

/// Filled cells of a `width`-cell bar for `value` on a `scale` axis.
pub fn bar_fill(value: f64, scale: f64, width: usize) -> usize {
    if scale <= 0.0 || value <= 0.0 {
        return 0;
    }
    (((value / scale) * width as f64) as usize).min(width)
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

/// Plain text rows of a rendered buffer, trailing blanks trimmed.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.y..area.y + area.height)
        .map(|y| {
            let row: String = (area.x..area.x + area.width)
                .map(|x| buf[(x, y)].symbol())
                .collect();
            row.trim_end().to_string()
        })
        .collect()
}

/// Draw the report below the cursor on stdout. When stdout is not a terminal
/// the report is printed as plain text instead.
pub fn print_report(summary: &AgronomicSummary) -> Result<()> {
    let widget = ReportWidget::new(summary);
    let height = widget.height();

    if !io::stdout().is_terminal() {
        let mut buf = Buffer::empty(Rect::new(0, 0, REPORT_WIDTH, height));
        widget.render(buf.area, &mut buf);
        for line in buffer_lines(&buf) {
            println!("{}", line);
        }
        return Ok(());
    }

    let (columns, _) = crossterm::terminal::size()?;
    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(io::stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )?;
    terminal.draw(|f| {
        let area = centered(f.area(), columns.min(REPORT_WIDTH));
        f.render_widget(widget, area);
    })?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn summary(irrigation_required: bool) -> AgronomicSummary {
        if irrigation_required {
            AgronomicSummary {
                period_days: 7,
                total_precip_mm: 7.0,
                total_etc_mm: 33.6,
                water_balance_mm: -26.6,
                irrigation_required: true,
                recommended_mm: 26.6,
                recommended_m3_per_ha: 266.0,
                recommended_total_m3: 532.0,
                surface_ha: 2.0,
                efficiency: 0.8,
                crop_name: "maize".into(),
                crop_stage: "mid_season".into(),
            }
        } else {
            AgronomicSummary {
                period_days: 5,
                total_precip_mm: 20.0,
                total_etc_mm: 12.5,
                water_balance_mm: 7.5,
                irrigation_required: false,
                recommended_mm: 0.0,
                recommended_m3_per_ha: 0.0,
                recommended_total_m3: 0.0,
                surface_ha: 1.0,
                efficiency: 0.85,
                crop_name: "tomato".into(),
                crop_stage: "initial".into(),
            }
        }
    }

    fn rendered(summary: &AgronomicSummary) -> String {
        let widget = ReportWidget::new(summary);
        let mut buf = Buffer::empty(Rect::new(0, 0, REPORT_WIDTH, widget.height()));
        widget.render(buf.area, &mut buf);
        buffer_lines(&buf).join("\n")
    }

    #[test]
    fn bars_scale_to_the_largest_value_with_a_floor() {
        assert_eq!(bar_fill(33.6, 33.6, 25), 25);
        assert_eq!(bar_fill(7.0, 33.6, 25), 5);
        assert_eq!(bar_fill(2.0, 10.0, 25), 5);
        assert_eq!(bar_fill(0.0, 10.0, 25), 0);
        assert_eq!(bar_fill(50.0, 10.0, 25), 25);
    }

    #[test]
    fn deficit_report_shows_the_recommendation() {
        let text = rendered(&summary(true));
        assert!(text.contains("IRRIGATION REQUIRED"));
        assert!(text.contains("Maize (Mid Season)"));
        assert!(text.contains("2.0 ha"));
        assert!(text.contains("Last 7 days"));
        assert!(text.contains("80%"));
        assert!(text.contains("33.6 mm"));
        assert!(text.contains("Water balance is negative (-26.6 mm)."));
        assert!(text.contains("266 m³ per hectare"));
        assert!(text.contains("532 m³"));
    }

    #[test]
    fn surplus_report_has_no_recommendation() {
        let text = rendered(&summary(false));
        assert!(text.contains("NO IRRIGATION NEEDED"));
        assert!(text.contains("Tomato (Initial)"));
        assert!(text.contains("Water balance is positive (+7.5 mm)."));
        assert!(!text.contains("RECOMMENDATION"));
    }

    #[test]
    fn decision_banner_is_coloured_by_outcome() {
        let s = summary(true);
        let widget = ReportWidget::new(&s);
        let height = widget.height();
        let mut terminal = Terminal::new(TestBackend::new(REPORT_WIDTH, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(ReportWidget::new(&s), f.area()))
            .unwrap();

        let buf = terminal.backend().buffer();
        let row = buffer_lines(buf)
            .iter()
            .position(|l| l.contains("IRRIGATION REQUIRED"))
            .unwrap() as u16;
        let col = (0..REPORT_WIDTH)
            .find(|x| buf[(*x, row)].symbol() == "I")
            .unwrap();
        assert_eq!(buf[(col, row)].bg, Theme::ERROR);
    }
}
