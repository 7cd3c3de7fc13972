use yew::prelude::*;

use crate::transport::ConnectionState;

/// CSS class and text shown for a connection state.
pub fn status_line(state: ConnectionState) -> (Option<&'static str>, &'static str) {
    match state {
        ConnectionState::Connecting => (None, " Connecting..."),
        ConnectionState::Connected => (Some("connected_state"), " Connected."),
        ConnectionState::Error => (Some("error_state"), "Error in the backend!"),
        ConnectionState::Closed => (None, " Connection closed."),
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct StatusBarProps {
    pub state: ConnectionState,
    pub url: AttrValue,
}

#[function_component(StatusBar)]
pub fn status_bar(props: &StatusBarProps) -> Html {
    let (class, text) = status_line(props.state);
    let color = match props.state {
        ConnectionState::Connected => "#3fb950",
        ConnectionState::Error => "#f85149",
        _ => "#c9d1d9",
    };
    html! {<div id="top-bar" style="display:flex; align-items:center; gap:12px; padding:6px 12px; background:#161b22; border-bottom:1px solid #30363d; font-size:14px;">
        <span id="status" class={classes!(class)} style={format!("color:{};", color)}>{ text }</span>
        <span style="opacity:0.6; font-size:12px;">{ props.url.clone() }</span>
    </div>}
}
