//! Service-tag icons and outbound map links shown in outlet popups.

use crate::outlet::LatLng;

/// Returns the emoji shown next to a known service tag.
#[must_use]
pub fn service_icon(service: &str) -> Option<&'static str> {
    let icon = match service {
        "24 Hours" => "🕐",
        "Birthday Party" => "🎉",
        "Breakfast" => "🍳",
        "Cashless Facility" => "💳",
        "Dessert Center" => "🍦",
        "Drive-Thru" => "🚗",
        "McCafe" => "☕",
        "McDelivery" => "📦",
        "Surau" => "🕌",
        "WiFi" => "📶",
        "Digital Order Kiosk" => "📱",
        "Electric Vehicle" => "🔌",
        _ => return None,
    };
    Some(icon)
}

/// Google Maps search link centred on `position`.
#[must_use]
pub fn google_maps_url(position: LatLng) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        position.lat, position.lng
    )
}
