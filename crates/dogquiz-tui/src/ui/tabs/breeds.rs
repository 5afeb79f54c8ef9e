use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use dogquiz_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

/// Image URLs listed in the detail pane before "...and N more"
const MAX_IMAGES_SHOWN: usize = 15;

/// Render the Breeds tab - breed list with a detail pane
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_breed_list(frame, app, chunks[0]);
    render_breed_detail(frame, app, chunks[1]);
}

fn render_breed_list(frame: &mut Frame, app: &App, area: Rect) {
    let list_state = &app.breed_list;
    let block = Block::default()
        .title(format!(" Breeds ({}) ", list_state.breeds.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if list_state.breeds.is_empty() {
        let line = if list_state.is_loading {
            Line::styled(" Loading breeds...", styles::muted_style())
        } else if let Some(ref error) = list_state.error {
            Line::styled(format!(" {}", error), styles::error_style())
        } else {
            Line::styled(" No breeds. Press [u] to update.", styles::muted_style())
        };
        let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(10).max(8);
    let items: Vec<ListItem> = list_state
        .breeds
        .iter()
        .enumerate()
        .map(|(i, breed)| {
            let count = if breed.has_sub_breeds() {
                format!(" ({})", breed.sub_breeds.len())
            } else {
                String::new()
            };
            let line = Line::from(vec![
                Span::raw(truncate_string(&breed.display_name(), name_width)),
                Span::styled(count, styles::muted_style()),
            ]);

            let style = if i == list_state.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(list_state.selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_breed_detail(frame: &mut Frame, app: &App, area: Rect) {
    let list_state = &app.breed_list;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(breed) = list_state.selected() else {
        frame.render_widget(block, area);
        return;
    };

    let block = block
        .title(format!(" {} ", breed.display_name()))
        .title_style(styles::title_style());

    let mut lines = vec![];

    lines.push(Line::from(vec![
        Span::styled("Breed: ", styles::highlight_style()),
        Span::raw(breed.name.clone()),
    ]));
    if breed.has_sub_breeds() {
        lines.push(Line::from(vec![
            Span::styled("Sub-breeds: ", styles::highlight_style()),
            Span::raw(breed.sub_breeds_display()),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::styled("Variants", styles::title_style()));
        for variant in breed.all_variants() {
            lines.push(Line::from(format!("  {}", variant)));
        }
    } else {
        lines.push(Line::styled("No sub-breeds", styles::muted_style()));
    }

    lines.push(Line::from(""));
    if list_state.loading_images_for.as_deref() == Some(breed.name.as_str()) {
        lines.push(Line::styled("Loading images...", styles::muted_style()));
    } else if let Some(images) = list_state.images_for(&breed.name) {
        lines.push(Line::styled(format!("Images ({})", images.len()), styles::title_style()));
        for url in images.iter().take(MAX_IMAGES_SHOWN) {
            lines.push(Line::styled(format!("  {}", url), styles::list_item_style()));
        }
        if images.len() > MAX_IMAGES_SHOWN {
            lines.push(Line::styled(
                format!("  ...and {} more", images.len() - MAX_IMAGES_SHOWN),
                styles::muted_style(),
            ));
        }
    } else {
        if let Some(ref error) = list_state.image_error {
            lines.push(Line::styled(error.clone(), styles::error_style()));
        }
        lines.push(Line::from(vec![
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" Load images", styles::muted_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
