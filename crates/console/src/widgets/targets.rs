use program_engine::ProgramView;

/// One configured output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChip {
    pub value: String,
}

/// Shortcut button adding a saved platform destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetButton {
    pub preset_id: String,
    pub label: String,
    pub masked_target: String,
}

pub fn build_target_chips(view: &ProgramView) -> Vec<TargetChip> {
    view.targets
        .iter()
        .map(|value| TargetChip {
            value: value.clone(),
        })
        .collect()
}

pub fn build_preset_buttons(view: &ProgramView) -> Vec<PresetButton> {
    view.presets
        .iter()
        .map(|preset| PresetButton {
            preset_id: preset.id.clone(),
            label: preset.name.clone(),
            masked_target: preset.masked_target.clone(),
        })
        .collect()
}
