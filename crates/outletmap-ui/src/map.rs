//! Declarative view model for the outlet map.
//!
//! `MapView` holds the outlet list, the current selection and its catchment
//! points, and derives markers and overlays from them on demand.

use serde::Serialize;

use outletmap_core::{google_maps_url, service_icon, CatchmentPoint, LatLng, Outlet, OutletId};

/// Kuala Lumpur city centre.
pub const DEFAULT_CENTER: LatLng = LatLng::new(3.139, 101.6869);
pub const DEFAULT_ZOOM: u8 = 12;

pub const CATCHMENT_RADIUS_M: f64 = 500.0;
pub const CATCHMENT_COLOR: &str = "green";
pub const CATCHMENT_FILL_OPACITY: f64 = 0.2;
pub const LINE_COLOR: &str = "red";

pub const MARKER_ICON_URL: &str = "https://unpkg.com/leaflet@1.7.1/dist/images/marker-icon.png";
pub const MARKER_ICON_SIZE: [u32; 2] = [25, 41];
pub const MARKER_ICON_ANCHOR: [u32; 2] = [12, 41];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    pub url_template: &'static str,
    pub attribution: &'static str,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: r#"&copy; <a href="https://osm.org">OSM</a>"#,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceLine {
    pub icon: Option<&'static str>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub name: String,
    pub address: String,
    pub maps_url: String,
    pub services: Vec<ServiceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Stable render key, `"{id}-{index}"`.
    pub key: String,
    pub outlet_id: OutletId,
    pub position: LatLng,
    pub popup: Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleOverlay {
    pub center: LatLng,
    pub radius_m: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineOverlay {
    pub from: LatLng,
    pub to: LatLng,
    pub color: &'static str,
}

/// A catchment fetch to perform, tagged so that a late answer for an older
/// selection can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchmentRequest {
    pub outlet_id: OutletId,
    pub seq: u64,
}

#[derive(Debug)]
pub struct MapView {
    center: LatLng,
    zoom: u8,
    tiles: TileLayer,
    outlets: Vec<Outlet>,
    selected: Option<Outlet>,
    catchments: Vec<CatchmentPoint>,
    pending: Option<CatchmentRequest>,
    next_seq: u64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tiles: TileLayer::default(),
            outlets: Vec::new(),
            selected: None,
            catchments: Vec::new(),
            pending: None,
            next_seq: 0,
        }
    }
}

impl MapView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    /// Forgets outlets, selection and catchments. The catchment sequence keeps
    /// counting, so a request issued before the reset never matches one after.
    pub fn reset(&mut self) {
        *self = Self {
            next_seq: self.next_seq,
            ..Self::default()
        };
    }

    pub fn set_outlets(&mut self, outlets: Vec<Outlet>) {
        self.outlets = outlets;
    }

    #[must_use]
    pub fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }

    /// One marker per outlet that has usable coordinates, in list order.
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        self.outlets
            .iter()
            .enumerate()
            .filter_map(|(idx, outlet)| {
                let position = outlet.position()?;
                Some(Marker {
                    key: format!("{}-{idx}", outlet.id),
                    outlet_id: outlet.id.clone(),
                    position,
                    popup: popup_for(outlet, position),
                })
            })
            .collect()
    }

    /// Records a marker click.
    ///
    /// Stores a copy of the outlet as the selection, clears the previous
    /// catchment list, and returns the tagged fetch to perform. Returns `None`
    /// if no plottable outlet has this id.
    pub fn select_outlet(&mut self, outlet_id: &OutletId) -> Option<CatchmentRequest> {
        let outlet = self
            .outlets
            .iter()
            .find(|o| &o.id == outlet_id && o.position().is_some())?
            .clone();

        self.next_seq += 1;
        let request = CatchmentRequest {
            outlet_id: outlet.id.clone(),
            seq: self.next_seq,
        };

        self.selected = Some(outlet);
        self.catchments.clear();
        self.pending = Some(request.clone());
        Some(request)
    }

    /// Applies a catchment response. Returns `false` and leaves state alone
    /// if `request` is not the latest one issued.
    pub fn apply_catchments(
        &mut self,
        request: &CatchmentRequest,
        points: Vec<CatchmentPoint>,
    ) -> bool {
        if self.pending.as_ref() != Some(request) {
            tracing::debug!(
                outlet_id = %request.outlet_id,
                seq = request.seq,
                "dropping stale catchment response"
            );
            return false;
        }
        self.pending = None;
        self.catchments = points;
        true
    }

    /// Marks the latest fetch as failed; the list stays empty.
    pub fn fail_catchments(&mut self, request: &CatchmentRequest) -> bool {
        if self.pending.as_ref() != Some(request) {
            return false;
        }
        self.pending = None;
        self.catchments.clear();
        true
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Outlet> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn catchments(&self) -> &[CatchmentPoint] {
        &self.catchments
    }

    #[must_use]
    pub fn pending_catchment(&self) -> Option<&CatchmentRequest> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn circles(&self) -> Vec<CircleOverlay> {
        self.catchments
            .iter()
            .map(|c| CircleOverlay {
                center: c.position(),
                radius_m: CATCHMENT_RADIUS_M,
                color: CATCHMENT_COLOR,
                fill_opacity: CATCHMENT_FILL_OPACITY,
            })
            .collect()
    }

    /// Lines from the selected outlet to each catchment point; empty when
    /// nothing is selected.
    #[must_use]
    pub fn lines(&self) -> Vec<LineOverlay> {
        let Some(from) = self.selected.as_ref().and_then(Outlet::position) else {
            return Vec::new();
        };
        self.catchments
            .iter()
            .map(|c| LineOverlay {
                from,
                to: c.position(),
                color: LINE_COLOR,
            })
            .collect()
    }
}

fn popup_for(outlet: &Outlet, position: LatLng) -> Popup {
    Popup {
        name: outlet.name.clone(),
        address: outlet.address.clone(),
        maps_url: google_maps_url(position),
        services: outlet
            .services
            .iter()
            .map(|s| ServiceLine {
                icon: service_icon(s),
                name: s.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(id: i64, lat: Option<f64>, lng: Option<f64>) -> Outlet {
        Outlet {
            id: OutletId::from(id),
            name: format!("Outlet {id}"),
            address: format!("{id} Jalan Test"),
            latitude: lat,
            longitude: lng,
            services: vec!["WiFi".to_owned(), "Valet".to_owned()],
        }
    }

    fn point(lat: f64, lng: f64) -> CatchmentPoint {
        CatchmentPoint {
            latitude: lat,
            longitude: lng,
        }
    }

    fn view_with_two() -> MapView {
        let mut view = MapView::new();
        view.set_outlets(vec![
            outlet(1, Some(3.10), Some(101.60)),
            outlet(2, Some(3.20), Some(101.70)),
        ]);
        view
    }

    #[test]
    fn reset_clears_state_but_keeps_sequence() {
        let mut view = view_with_two();
        let before = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        view.reset();

        assert!(view.outlets().is_empty());
        assert!(view.selected().is_none());
        assert!(view.pending_catchment().is_none());

        view.set_outlets(vec![outlet(1, Some(3.10), Some(101.60))]);
        let after = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        assert!(after.seq > before.seq);
        assert!(!view.apply_catchments(&before, vec![point(3.11, 101.61)]));
    }

    #[test]
    fn defaults_center_on_kuala_lumpur() {
        let view = MapView::new();
        assert_eq!(view.center(), LatLng::new(3.139, 101.6869));
        assert_eq!(view.zoom(), 12);
        assert!(view.tiles().url_template.contains("openstreetmap"));
    }

    #[test]
    fn outlets_without_coordinates_get_no_marker() {
        let mut view = MapView::new();
        view.set_outlets(vec![
            outlet(1, Some(3.1), Some(101.6)),
            outlet(2, None, Some(101.6)),
            outlet(3, Some(3.1), None),
            outlet(4, None, None),
            outlet(5, Some(3.2), Some(101.7)),
        ]);

        let markers = view.markers();
        let keys: Vec<&str> = markers.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["1-0", "5-4"]);
        assert_eq!(view.markers(), markers, "filter is stable across calls");
    }

    #[test]
    fn popup_lists_services_with_icons() {
        let view = view_with_two();
        let popup = &view.markers()[0].popup;
        assert_eq!(popup.name, "Outlet 1");
        assert_eq!(
            popup.maps_url,
            "https://www.google.com/maps/search/?api=1&query=3.1,101.6"
        );
        assert_eq!(popup.services[0].icon, Some("📶"));
        assert_eq!(popup.services[1].icon, None);
        assert_eq!(popup.services[1].name, "Valet");
    }

    #[test]
    fn selecting_unknown_or_unplottable_outlet_is_ignored() {
        let mut view = MapView::new();
        view.set_outlets(vec![outlet(9, None, None)]);
        assert!(view.select_outlet(&OutletId::from(9)).is_none());
        assert!(view.select_outlet(&OutletId::from(404)).is_none());
        assert!(view.selected().is_none());
    }

    #[test]
    fn circles_and_lines_follow_catchments() {
        let mut view = view_with_two();
        assert!(view.lines().is_empty());

        let req = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        assert!(view.apply_catchments(&req, vec![point(3.11, 101.61), point(3.12, 101.62)]));

        let circles = view.circles();
        assert_eq!(circles.len(), 2);
        assert!((circles[0].radius_m - 500.0).abs() < f64::EPSILON);
        assert_eq!(circles[0].color, "green");

        let lines = view.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].from, LatLng::new(3.10, 101.60));
        assert_eq!(lines[1].to, LatLng::new(3.12, 101.62));
        assert_eq!(lines[1].color, "red");
    }

    #[test]
    fn selecting_b_replaces_a_entirely() {
        let mut view = view_with_two();

        let a = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        view.apply_catchments(&a, vec![point(3.11, 101.61), point(3.12, 101.62)]);

        let b = view.select_outlet(&OutletId::from(2)).unwrap();
        assert!(view.catchments().is_empty(), "A's points cleared on click");
        view.apply_catchments(&b, vec![point(3.21, 101.71)]);

        assert_eq!(view.catchments(), &[point(3.21, 101.71)]);
        assert_eq!(view.selected().map(|o| o.id.clone()), Some(OutletId::from(2)));
        assert!(view.lines().iter().all(|l| l.from == LatLng::new(3.20, 101.70)));
    }

    #[test]
    fn late_response_for_previous_selection_is_dropped() {
        let mut view = view_with_two();

        let a = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        let b = view.select_outlet(&OutletId::from(2)).unwrap();
        assert!(view.apply_catchments(&b, vec![point(3.21, 101.71)]));

        assert!(!view.apply_catchments(&a, vec![point(9.0, 9.0)]));
        assert!(!view.fail_catchments(&a));
        assert_eq!(view.catchments(), &[point(3.21, 101.71)]);
    }

    #[test]
    fn reselecting_same_outlet_drops_the_older_response() {
        let mut view = view_with_two();
        let first = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        let second = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        assert_ne!(first, second);
        assert!(!view.apply_catchments(&first, vec![point(1.0, 1.0)]));
        assert!(view.apply_catchments(&second, vec![]));
    }

    #[test]
    fn failed_fetch_leaves_list_empty() {
        let mut view = view_with_two();
        let req = view.select_outlet(&OutletId::from(1_i64)).unwrap();
        assert!(view.fail_catchments(&req));
        assert!(view.catchments().is_empty());
        assert!(view.pending_catchment().is_none());
        assert!(view.selected().is_some());
    }
}
