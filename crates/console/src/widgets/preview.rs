use program_engine::ProgramView;

/// Values needed by the UI to draw the preview player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPanel {
    pub title: String,
    /// Absolute URL of the previewed upload, when it is still in the library.
    pub url: Option<String>,
    pub playing: bool,
    pub play_label: &'static str,
}

/// Builds the preview panel, or `None` when nothing is queued.
pub fn build_preview_panel(view: &ProgramView, base_url: &str) -> Option<PreviewPanel> {
    let entry = view.preview_entry()?;
    let base = base_url.trim_end_matches('/');
    Some(PreviewPanel {
        title: entry.name.clone(),
        url: entry
            .playable_path
            .as_deref()
            .map(|path| format!("{base}{path}")),
        playing: view.playing,
        play_label: if view.playing { "Pause" } else { "Play" },
    })
}

#[cfg(test)]
mod tests {
    use program_engine::{ProgramView, QueueEntry};

    use super::build_preview_panel;

    fn view(playing: bool, playable_path: Option<&str>) -> ProgramView {
        ProgramView {
            queue: vec![QueueEntry {
                id: "v1".to_string(),
                name: "intro.mp4".to_string(),
                position: 1,
                playable_path: playable_path.map(str::to_string),
            }],
            preview_id: Some("v1".to_string()),
            playing,
            ..ProgramView::default()
        }
    }

    #[test]
    fn panel_joins_upload_path_with_backend_url() {
        let panel = build_preview_panel(&view(false, Some("/uploads/f1.mp4")), "http://host:8080/")
            .expect("previewed entry should produce a panel");

        assert_eq!(panel.title, "intro.mp4");
        assert_eq!(panel.url.as_deref(), Some("http://host:8080/uploads/f1.mp4"));
        assert_eq!(panel.play_label, "Play");
    }

    #[test]
    fn playing_panel_offers_pause_and_orphans_have_no_url() {
        let panel = build_preview_panel(&view(true, None), "http://host")
            .expect("previewed entry should produce a panel");

        assert_eq!(panel.play_label, "Pause");
        assert_eq!(panel.url, None);
    }

    #[test]
    fn empty_queue_has_no_panel() {
        assert_eq!(build_preview_panel(&ProgramView::default(), "http://host"), None);
    }
}
