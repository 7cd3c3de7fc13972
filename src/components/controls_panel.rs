use yew::prelude::*;

use crate::nav::GoalView;
use crate::state::TeleopState;
use crate::state::teleop::SPEED_LEVELS;

fn goal_text(goal: &GoalView) -> String {
    match goal {
        GoalView::None => "no goal".to_string(),
        GoalView::Outstanding { state: None, .. } => "goal sent".to_string(),
        GoalView::Outstanding {
            state: Some(state), ..
        } => format!("goal {}", state.label()),
        GoalView::Finished { state, .. } => format!("last goal {}", state.label()),
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub goal: GoalView,
    pub teleop: TeleopState,
    pub with_orientation: bool,
    pub show_cloud: bool,
    pub show_path: bool,
    pub on_cancel: Callback<()>,
    pub on_toggle_cloud: Callback<()>,
    pub on_toggle_path: Callback<()>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let cancel_cb = {
        let cb = props.on_cancel.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let cloud_cb = {
        let cb = props.on_toggle_cloud.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let path_cb = {
        let cb = props.on_toggle_path.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let outstanding = matches!(props.goal, GoalView::Outstanding { .. });
    let (v, w) = SPEED_LEVELS[props.teleop.speed_level];
    let held: Vec<String> = props
        .teleop
        .held
        .iter()
        .map(|k| format!("{:?}", k).to_lowercase())
        .collect();
    let hint = if props.with_orientation {
        "Press on the map and drag to set a goal heading"
    } else {
        "Double-click the map to send a goal"
    };
    html! {<div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:220px; display:flex; flex-direction:column; gap:6px;">
        <div style="font-size:13px;">{ goal_text(&props.goal) }</div>
        <button onclick={cancel_cb} disabled={!outstanding}>{"Cancel goal"}</button>
        <label style="display:flex; align-items:center; gap:8px; cursor:pointer;">
            <input type="checkbox" checked={props.show_cloud} onclick={cloud_cb} />
            <span>{"Show point cloud"}</span>
        </label>
        <label style="display:flex; align-items:center; gap:8px; cursor:pointer;">
            <input type="checkbox" checked={props.show_path} onclick={path_cb} />
            <span>{"Show planned path"}</span>
        </label>
        <div style="font-size:12px; font-variant-numeric:tabular-nums;">
            { format!("speed {}/{}: {:.2} m/s, {:.1} rad/s", props.teleop.speed_level + 1, SPEED_LEVELS.len(), v, w) }
        </div>
        <div style="font-size:12px; min-height:1em;">
            { if held.is_empty() { "stopped".to_string() } else { format!("driving: {}", held.join(" + ")) } }
        </div>
        <div style="font-size:11px; opacity:0.7;">{ hint }</div>
        <div style="font-size:11px; opacity:0.7;">{"WASD / arrows: drive, R/F: speed"}</div>
    </div>}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::actionlib_msgs::GoalState;

    #[test]
    fn goal_text_follows_lifecycle() {
        assert_eq!(goal_text(&GoalView::None), "no goal");
        let id = "goal_1".to_string();
        assert_eq!(
            goal_text(&GoalView::Outstanding {
                id: id.clone(),
                state: Some(GoalState::Active)
            }),
            "goal active"
        );
        assert_eq!(
            goal_text(&GoalView::Finished {
                id,
                state: GoalState::Succeeded
            }),
            "last goal succeeded"
        );
    }
}
