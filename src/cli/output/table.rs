//! Table output for game listings using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::cli::output::truncate;
use crate::domain::models::GameSessionSummary;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    /// Formatter that colours output when the terminal allows it.
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    /// Format games with their session state.
    pub fn format_games(&self, games: &[GameSessionSummary]) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(
            ["Game", "Name", "Handler", "Session", "Improvements", "Last", "Cost"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

        for game in games {
            let session = if game.has_active_session {
                format!("{} in session", game.session_improvement_count)
            } else {
                "none".to_string()
            };
            let session_cell = if self.use_colors {
                let color = if game.has_active_session {
                    Color::Green
                } else {
                    Color::DarkGrey
                };
                Cell::new(session).fg(color)
            } else {
                Cell::new(session)
            };

            table.add_row(vec![
                Cell::new(&game.game_id),
                Cell::new(truncate(&game.name, 30)),
                Cell::new(
                    game.handler
                        .as_ref()
                        .map_or_else(|| "-".to_string(), |h| h.room_name.clone()),
                ),
                session_cell,
                Cell::new(game.improvement_count),
                Cell::new(
                    game.last_improvement_at
                        .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
                ),
                Cell::new(format!("${:.2}", game.last_improvement_cost)),
            ]);
        }

        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{GameMetadata, HandlerDescriptor};

    #[test]
    fn formats_rows() {
        let mut metadata =
            GameMetadata::new("Tag", "").with_handler(HandlerDescriptor::new("tag_room", "server.ts"));
        metadata.has_active_session = true;
        metadata.session_improvement_count = 2;
        metadata.improvement_count = 7;
        metadata.last_improvement_cost = 0.125;

        let rows = vec![GameSessionSummary::from_metadata("tag", &metadata)];
        let rendered = TableFormatter { use_colors: false }.format_games(&rows);

        assert!(rendered.contains("tag_room"));
        assert!(rendered.contains("2 in session"));
        assert!(rendered.contains("$0.12") || rendered.contains("$0.13"));
    }
}
