use lumen_engine::core::{FrameOrchestrator, OrchestratorState};
use lumen_engine::input::{InputFrame, Key, Modifiers};
use lumen_engine::render::RenderSettings;

use crate::cli::RendererKind;

const LIGHT_STEP: i64 = 1;
const LIGHT_STEP_FAST: i64 = 64;

/// What a key press asks the studio to do.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PanelAction {
    Settings(RenderSettings),
    Swap(RendererKind),
    Exit,
}

/// Turns this frame's key presses into actions against `settings`.
///
/// Setting edits accumulate, so `Tab` and `↑` in one frame yield one combined request.
pub fn actions(frame: &InputFrame, modifiers: Modifiers, settings: RenderSettings) -> Vec<PanelAction> {
    let mut out = Vec::new();

    if frame.pressed(Key::Escape) {
        out.push(PanelAction::Exit);
        return out;
    }

    let step = if modifiers.shift { LIGHT_STEP_FAST } else { LIGHT_STEP };
    let mut next = settings;
    if frame.pressed(Key::Tab) {
        next = next.with_mode(next.mode.toggled());
    }
    if frame.pressed(Key::ArrowUp) {
        next = next.with_num_lights(i64::from(next.num_lights) + step);
    }
    if frame.pressed(Key::ArrowDown) {
        next = next.with_num_lights(i64::from(next.num_lights) - step);
    }
    if next != settings {
        out.push(PanelAction::Settings(next));
    }

    // Lowest slot wins if several digits land in one frame.
    let swap = frame
        .keys_pressed
        .iter()
        .filter_map(|k| k.digit())
        .filter_map(|d| RendererKind::from_slot(d).map(|kind| (d, kind)))
        .min_by_key(|(d, _)| *d)
        .map(|(_, kind)| kind);
    if let Some(kind) = swap {
        out.push(PanelAction::Swap(kind));
    }

    out
}

/// Window title mirroring the orchestrator state.
pub fn title(orchestrator: &FrameOrchestrator) -> String {
    let s = orchestrator.settings();
    match (orchestrator.state(), orchestrator.renderer_name()) {
        (OrchestratorState::Running, Some(name)) if name == "deferred" => format!(
            "lumen · {name} · {} · {} lights",
            s.mode, s.num_lights
        ),
        (OrchestratorState::Running, Some(name)) => format!("lumen · {name}"),
        _ => "lumen · idle".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::render::CompositionMode;

    fn frame(keys: &[Key]) -> InputFrame {
        let mut f = InputFrame::default();
        f.keys_pressed.extend(keys.iter().copied());
        f
    }

    fn shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::default()
        }
    }

    // ── settings ──────────────────────────────────────────────────────────

    #[test]
    fn no_keys_no_actions() {
        assert!(actions(&frame(&[]), Modifiers::default(), RenderSettings::default()).is_empty());
    }

    #[test]
    fn tab_toggles_mode() {
        let a = actions(&frame(&[Key::Tab]), Modifiers::default(), RenderSettings::default());
        assert_eq!(
            a,
            vec![PanelAction::Settings(
                RenderSettings::default().with_mode(CompositionMode::GBuffersView)
            )]
        );
    }

    #[test]
    fn arrows_step_light_count() {
        let base = RenderSettings::default();
        let up = actions(&frame(&[Key::ArrowUp]), Modifiers::default(), base);
        assert_eq!(up, vec![PanelAction::Settings(base.with_num_lights(129))]);

        let down = actions(&frame(&[Key::ArrowDown]), shift(), base);
        assert_eq!(down, vec![PanelAction::Settings(base.with_num_lights(64))]);
    }

    #[test]
    fn light_count_stays_in_range() {
        let max = RenderSettings::default().with_num_lights(1024);
        assert!(actions(&frame(&[Key::ArrowUp]), shift(), max).is_empty());

        let min = RenderSettings::default().with_num_lights(1);
        assert!(actions(&frame(&[Key::ArrowDown]), Modifiers::default(), min).is_empty());

        let low = RenderSettings::default().with_num_lights(10);
        let a = actions(&frame(&[Key::ArrowDown]), shift(), low);
        assert_eq!(a, vec![PanelAction::Settings(low.with_num_lights(1))]);
    }

    #[test]
    fn combined_edits_make_one_request() {
        let base = RenderSettings::default();
        let a = actions(&frame(&[Key::Tab, Key::ArrowUp]), Modifiers::default(), base);
        assert_eq!(
            a,
            vec![PanelAction::Settings(
                base.with_mode(CompositionMode::GBuffersView).with_num_lights(129)
            )]
        );
    }

    // ── swaps and exit ────────────────────────────────────────────────────

    #[test]
    fn digits_swap_renderers() {
        let a = actions(&frame(&[Key::Digit2]), Modifiers::default(), RenderSettings::default());
        assert_eq!(a, vec![PanelAction::Swap(RendererKind::RotatingCube)]);

        let a = actions(&frame(&[Key::Digit4, Key::Digit1]), Modifiers::default(), RenderSettings::default());
        assert_eq!(a, vec![PanelAction::Swap(RendererKind::Triangle)]);

        assert!(actions(&frame(&[Key::Digit9]), Modifiers::default(), RenderSettings::default()).is_empty());
    }

    #[test]
    fn escape_overrides_everything() {
        let a = actions(&frame(&[Key::Escape, Key::Tab, Key::Digit1]), Modifiers::default(), RenderSettings::default());
        assert_eq!(a, vec![PanelAction::Exit]);
    }

    // ── title ─────────────────────────────────────────────────────────────

    #[test]
    fn idle_title() {
        let o = FrameOrchestrator::new(RenderSettings::default());
        assert_eq!(title(&o), "lumen · idle");
    }
}
