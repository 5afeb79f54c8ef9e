use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use dogquiz_core::models::{Breed, QuizQuestion};
use dogquiz_core::state::{QuizPhase, QUESTIONS_PER_SESSION};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Guess the Breed ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.quiz.phase() {
        QuizPhase::Loading => {
            let text = if app.quiz.needs_preload() {
                "Loading dog breeds..."
            } else {
                "Loading question..."
            };
            render_centered(frame, inner, vec![Line::styled(text, styles::muted_style())]);
        }
        QuizPhase::Error(message) => {
            let lines = vec![
                Line::styled(message.to_string(), styles::error_style()),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[r]", styles::help_key_style()),
                    Span::styled(" Retry", styles::muted_style()),
                ]),
            ];
            render_centered(frame, inner, lines);
        }
        QuizPhase::Active {
            question,
            selection,
            show_result,
            is_correct,
            score,
            count,
        } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Progress
                    Constraint::Length(1), // Score
                    Constraint::Length(3), // Image
                    Constraint::Length(2), // Prompt
                    Constraint::Min(6),    // Options
                    Constraint::Length(3), // Verdict / next
                ])
                .split(inner);

            let gauge = Gauge::default()
                .gauge_style(styles::gauge_style())
                .ratio(app.quiz.progress())
                .label(format!("Question {}/{}", count, QUESTIONS_PER_SESSION));
            frame.render_widget(gauge, chunks[0]);

            let score_line = Line::from(vec![
                Span::styled("Score: ", styles::muted_style()),
                Span::styled(score.to_string(), styles::highlight_style()),
            ])
            .alignment(Alignment::Right);
            frame.render_widget(Paragraph::new(score_line), chunks[1]);

            let image = Paragraph::new(vec![
                Line::styled("Image:", styles::muted_style()),
                Line::styled(question.image_url.clone(), styles::list_item_style()),
            ])
            .wrap(Wrap { trim: true });
            frame.render_widget(image, chunks[2]);

            let prompt = Paragraph::new(Line::styled("What breed is this dog?", styles::title_style()))
                .alignment(Alignment::Center);
            frame.render_widget(prompt, chunks[3]);

            let options = option_lines(question, selection, show_result, app.option_cursor);
            frame.render_widget(Paragraph::new(options), chunks[4]);

            if show_result {
                let verdict = if is_correct { "🎉 Correct!" } else { "❌ Wrong!" };
                let mut lines = vec![Line::styled(verdict, styles::verdict_style(is_correct))];
                if !is_correct {
                    lines.push(Line::styled(
                        format!("It was {}", question.correct_answer),
                        styles::muted_style(),
                    ));
                }
                lines.push(Line::from(vec![
                    Span::styled("[n] ", styles::help_key_style()),
                    Span::styled(next_label(count, app.auto_advance.remaining()), styles::muted_style()),
                ]));
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[5]);
            }
        }
        QuizPhase::Finished { score, count } => {
            let lines = vec![
                Line::styled("Game Complete!", styles::title_style()),
                Line::from(""),
                Line::styled(format!("Your Score: {}/{}", score, count), styles::highlight_style()),
                Line::styled(format!("({}%)", score_percentage(score, count)), styles::muted_style()),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[r]", styles::help_key_style()),
                    Span::styled(" Play Again", styles::muted_style()),
                ]),
            ];
            render_centered(frame, inner, lines);
        }
    }
}

fn option_lines<'a>(
    question: &'a QuizQuestion,
    selection: Option<&Breed>,
    show_result: bool,
    cursor: usize,
) -> Vec<Line<'a>> {
    let correct = question.correct_index();
    let mut lines = Vec::new();
    for (i, option) in question.options.iter().enumerate() {
        let picked = selection.is_some_and(|s| s.name == option.name);
        let style = if show_result && correct == Some(i) {
            styles::correct_option_style()
        } else if show_result && picked {
            styles::wrong_option_style()
        } else if !show_result && i == cursor {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        lines.push(Line::styled(format!("  [{}] {}", i + 1, option.display_name()), style));
        lines.push(Line::from(""));
    }
    lines
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let area = Rect::new(area.x, area.y + top, area.width, height.min(area.height));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Label for the advance button, with the countdown while it runs
fn next_label(count: u32, remaining: Option<u8>) -> String {
    if count >= QUESTIONS_PER_SESSION {
        return "Finish Game".to_string();
    }
    match remaining {
        Some(secs) => format!("Next Question ({})", secs),
        None => "Next Question".to_string(),
    }
}

/// Whole-number percentage, rounded down
fn score_percentage(score: u32, count: u32) -> u32 {
    if count == 0 {
        0
    } else {
        score * 100 / count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_percentage() {
        assert_eq!(score_percentage(0, 0), 0);
        assert_eq!(score_percentage(7, 10), 70);
        assert_eq!(score_percentage(2, 3), 66);
    }

    #[test]
    fn test_next_label() {
        assert_eq!(next_label(3, Some(2)), "Next Question (2)");
        assert_eq!(next_label(3, None), "Next Question");
        assert_eq!(next_label(QUESTIONS_PER_SESSION, Some(1)), "Finish Game");
    }

    #[test]
    fn test_option_lines_mark_correct_and_wrong_pick() {
        let options: Vec<Breed> = ["beagle", "pug", "akita", "boxer"].into_iter().map(Breed::new).collect();
        let question = QuizQuestion::new("https://images.dog.ceo/breeds/pug/1.jpg".to_string(), Breed::new("pug"), options);
        let picked = Breed::new("akita");

        // One option line followed by a spacer per option
        let lines = option_lines(&question, Some(&picked), true, 0);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0].style, styles::list_item_style());
        assert_eq!(lines[2].style, styles::correct_option_style());
        assert_eq!(lines[4].style, styles::wrong_option_style());

        let lines = option_lines(&question, None, false, 3);
        assert_eq!(lines[2].style, styles::list_item_style());
        assert_eq!(lines[6].style, styles::selected_style());
    }
}
