//! Plain-text rendering of map state for the terminal.

use outletmap_core::{service_icon, Outlet};
use outletmap_ui::{MapView, Update};

pub(crate) fn outlet_line(outlet: &Outlet) -> String {
    let position = outlet.position().map_or_else(
        || "(no coordinates)".to_owned(),
        |p| format!("{:.5},{:.5}", p.lat, p.lng),
    );
    let services = outlet
        .services
        .iter()
        .map(|s| match service_icon(s) {
            Some(icon) => format!("{icon} {s}"),
            None => s.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    if services.is_empty() {
        format!("{}\t{}\t{position}", outlet.id, outlet.name)
    } else {
        format!("{}\t{}\t{position}\t{services}", outlet.id, outlet.name)
    }
}

/// Summary of the selection and its overlays.
pub(crate) fn selection_summary(map: &MapView) -> String {
    let Some(selected) = map.selected() else {
        return "no outlet selected".to_owned();
    };
    format!(
        "{} ({}): {} circles, {} lines",
        selected.name,
        selected.id,
        map.circles().len(),
        map.lines().len()
    )
}

/// One status line for non-chat updates; chat text is streamed separately.
pub(crate) fn update_line(update: &Update) -> Option<String> {
    match update {
        Update::OutletsLoaded { markers, skipped } => Some(format!(
            "loaded {markers} markers ({skipped} outlets without coordinates)"
        )),
        Update::OutletsFailed => Some("could not load outlets".to_owned()),
        Update::CatchmentsLoaded { outlet_id, count } => {
            Some(format!("outlet {outlet_id}: {count} catchment points"))
        }
        Update::CatchmentsFailed { outlet_id } => {
            Some(format!("outlet {outlet_id}: no catchment data"))
        }
        Update::ChatFailed { message } => Some((*message).to_owned()),
        Update::ChatRendered { .. } | Update::ChatFinished => None,
    }
}
