use serde::{Deserialize, Serialize};
use yew::prelude::*;

use super::camera_controls::CameraControls;
use super::controls_panel::ControlsPanel;
use super::nav_view::NavView;
use super::status_bar::StatusBar;
use crate::config::AppConfig;
use crate::context::Console;
use crate::nav::GoalView;
use crate::state::{ScreenPoint, TeleopState};
use crate::util::{load_json, store_json};

const SETTINGS_KEY: &str = "nav_view_settings";
/// Wheel-equivalent delta for one zoom button press.
const ZOOM_STEP: f64 = 300.0;

/// Viewer toggles remembered across page loads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub show_cloud: bool,
    pub show_path: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_cloud: true,
            show_path: true,
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: AppConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let console = {
        let config = props.config.clone();
        use_state(move || Console::connect(config))
    };
    let connection = use_state(|| console.ctx.ros.state());
    let goal = use_state(GoalView::default);
    let teleop = use_state(TeleopState::default);
    let settings = use_state(|| load_json::<ViewSettings>(SETTINGS_KEY).unwrap_or_default());

    // Route bridge and navigator notifications into component state
    {
        let console = (*console).clone();
        let connection = connection.clone();
        let goal = goal.clone();
        use_effect_with((), move |_| {
            let ros = console.ctx.ros.clone();
            {
                let connection = connection.clone();
                ros.on_connection_change(move |state| connection.set(state));
            }
            connection.set(ros.state());
            console
                .navigator
                .borrow_mut()
                .on_goal_change(move |view| goal.set(view.clone()));
            move || ros.close()
        });
    }
    // Persist settings & apply to the scene
    {
        let console = (*console).clone();
        use_effect_with(*settings, move |settings| {
            store_json(SETTINGS_KEY, settings);
            let mut scene = console.ctx.scene.borrow_mut();
            scene.show_cloud = settings.show_cloud;
            scene.show_path = settings.show_path;
            || ()
        });
    }

    let on_teleop = {
        let teleop = teleop.clone();
        Callback::from(move |state: TeleopState| teleop.set(state))
    };
    let on_cancel = {
        let console = (*console).clone();
        Callback::from(move |_| {
            console.navigator.borrow().cancel_goal();
        })
    };
    let on_toggle_cloud = {
        let settings = settings.clone();
        Callback::from(move |_| {
            settings.set(ViewSettings {
                show_cloud: !settings.show_cloud,
                ..*settings
            })
        })
    };
    let on_toggle_path = {
        let settings = settings.clone();
        Callback::from(move |_| {
            settings.set(ViewSettings {
                show_path: !settings.show_path,
                ..*settings
            })
        })
    };
    let zoom_cb = |delta: f64| {
        let console = (*console).clone();
        Callback::from(move |_: ()| {
            let mut scene = console.ctx.scene.borrow_mut();
            let (w, h) = scene.canvas_size;
            scene
                .camera
                .zoom_at(ScreenPoint::new(w * 0.5, h * 0.5), delta);
        })
    };
    let on_fit = {
        let console = (*console).clone();
        Callback::from(move |_| console.ctx.scene.borrow_mut().fit_to_grid())
    };

    let config = &console.ctx.config;
    html! { <ContextProvider<Console> context={(*console).clone()}>
        <div style="display:flex; flex-direction:column; width:100vw; height:100vh; background:#0e1116; color:#c9d1d9;">
            <StatusBar state={*connection} url={AttrValue::from(config.url.clone())} />
            <div style="position:relative; flex:1; overflow:hidden;">
                <NavView on_teleop={on_teleop} />
                <ControlsPanel
                    goal={(*goal).clone()}
                    teleop={(*teleop).clone()}
                    with_orientation={config.navigator.with_orientation}
                    show_cloud={settings.show_cloud}
                    show_path={settings.show_path}
                    on_cancel={on_cancel}
                    on_toggle_cloud={on_toggle_cloud}
                    on_toggle_path={on_toggle_path}
                />
                <CameraControls on_zoom_in={zoom_cb(-ZOOM_STEP)} on_zoom_out={zoom_cb(ZOOM_STEP)} on_fit={on_fit} />
            </div>
        </div>
    </ContextProvider<Console>> }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_tolerate_missing_fields() {
        let s: ViewSettings = serde_json::from_str(r#"{"show_path":false}"#).unwrap();
        assert_eq!(
            s,
            ViewSettings {
                show_cloud: true,
                show_path: false
            }
        );
    }
}
