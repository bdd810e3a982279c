// src/services/geo_service.rs

use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::geo::{GeoBounds, GeocodeResult, GeoPoint, NearbyEntry, NearbyKind, ReverseGeocodeResult},
};

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// --- MATH (esfera WGS-84, distâncias em metros) ---

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::InvalidCoordinates(latitude, longitude));
    }
    Ok(())
}

pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

pub fn bounds(points: &[GeoPoint]) -> Option<GeoBounds> {
    if points.is_empty() {
        return None;
    }

    let mut result = GeoBounds {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lng: f64::INFINITY,
        max_lng: f64::NEG_INFINITY,
    };

    for point in points {
        result.min_lat = result.min_lat.min(point.latitude);
        result.max_lat = result.max_lat.max(point.latitude);
        result.min_lng = result.min_lng.min(point.longitude);
        result.max_lng = result.max_lng.max(point.longitude);
    }

    Some(result)
}

// --- NOMINATIM (respostas parciais que nos interessam) ---

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    house_number: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

struct CacheEntry<T> {
    stored_at: Instant,
    value: T,
}

type Cache<T> = Arc<Mutex<HashMap<String, CacheEntry<T>>>>;

fn cache_get<T: Clone>(cache: &Cache<T>, key: &str) -> Option<T> {
    let mut guard = cache.lock().expect("cache lock");
    match guard.get(key) {
        Some(entry) if entry.stored_at.elapsed() < CACHE_TTL => Some(entry.value.clone()),
        Some(_) => {
            guard.remove(key);
            None
        }
        None => None,
    }
}

fn cache_put<T>(cache: &Cache<T>, key: String, value: T) {
    let mut guard = cache.lock().expect("cache lock");
    guard.insert(
        key,
        CacheEntry {
            stored_at: Instant::now(),
            value,
        },
    );
}

#[derive(Clone)]
pub struct GeoService {
    client_repo: ClientRepository,
    http: reqwest::Client,
    geocode_cache: Cache<GeocodeResult>,
    reverse_cache: Cache<ReverseGeocodeResult>,
}

impl GeoService {
    pub fn new(client_repo: ClientRepository) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("SmartLeakPro/1.0 (contact@smartleakpro.com)")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Falha ao construir o cliente HTTP");

        Self {
            client_repo,
            http,
            geocode_cache: Arc::new(Mutex::new(HashMap::new())),
            reverse_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // Endereço -> coordenadas, com cache de 24h em memória
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, AppError> {
        if address.trim().is_empty() {
            return Err(crate::common::error::field_error("address", "required"));
        }

        let cache_key = format!("geocode:{}", address);
        if let Some(hit) = cache_get(&self.geocode_cache, &cache_key) {
            return Ok(hit);
        }

        let places: Vec<NominatimPlace> = self
            .http
            .get(NOMINATIM_SEARCH_URL)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Geocodificação falhou para '{}': {}", address, e);
                AppError::GeocodingUnavailable
            })?
            .error_for_status()
            .map_err(|_| AppError::GeocodingUnavailable)?
            .json()
            .await
            .map_err(|_| AppError::GeocodingUnavailable)?;

        let place = places
            .into_iter()
            .next()
            .ok_or(AppError::NotFound("address"))?;

        let result = GeocodeResult {
            latitude: place
                .lat
                .parse()
                .map_err(|_| AppError::GeocodingUnavailable)?,
            longitude: place
                .lon
                .parse()
                .map_err(|_| AppError::GeocodingUnavailable)?,
            display_name: place.display_name,
        };

        cache_put(&self.geocode_cache, cache_key, result.clone());

        Ok(result)
    }

    // Coordenadas -> endereço
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeResult, AppError> {
        validate_coordinates(latitude, longitude)?;

        let cache_key = format!("reverse:{}:{}", latitude, longitude);
        if let Some(hit) = cache_get(&self.reverse_cache, &cache_key) {
            return Ok(hit);
        }

        let reverse: NominatimReverse = self
            .http
            .get(NOMINATIM_REVERSE_URL)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    "Geocodificação reversa falhou para {}, {}: {}",
                    latitude,
                    longitude,
                    e
                );
                AppError::GeocodingUnavailable
            })?
            .error_for_status()
            .map_err(|_| AppError::GeocodingUnavailable)?
            .json()
            .await
            .map_err(|_| AppError::GeocodingUnavailable)?;

        // Nominatim usa city/town/village conforme o tamanho da comuna
        let city = reverse
            .address
            .city
            .or(reverse.address.town)
            .or(reverse.address.village);

        let result = ReverseGeocodeResult {
            display_name: reverse.display_name,
            road: reverse.address.road,
            house_number: reverse.address.house_number,
            city,
            postcode: reverse.address.postcode,
            country: reverse.address.country,
            country_code: reverse.address.country_code,
        };

        cache_put(&self.reverse_cache, cache_key, result.clone());

        Ok(result)
    }

    pub fn distance(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, AppError> {
        validate_coordinates(from.latitude, from.longitude)?;
        validate_coordinates(to.latitude, to.longitude)?;

        Ok(haversine_meters(from, to))
    }

    pub async fn nearby(
        &self,
        kind: NearbyKind,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<NearbyEntry>, AppError> {
        validate_coordinates(latitude, longitude)?;

        if radius_meters <= 0.0 {
            return Err(crate::common::error::field_error("radius", "invalid_radius"));
        }

        match kind {
            NearbyKind::Clients => {
                self.client_repo
                    .nearby_clients(latitude, longitude, radius_meters, limit)
                    .await
            }
            NearbyKind::Sites => {
                self.client_repo
                    .nearby_sites(latitude, longitude, radius_meters, limit)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: GeoPoint = GeoPoint {
        latitude: 48.8566,
        longitude: 2.3522,
    };
    const LYON: GeoPoint = GeoPoint {
        latitude: 45.7640,
        longitude: 4.8357,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_meters(PARIS, PARIS), 0.0);
    }

    #[test]
    fn paris_lyon_is_about_392_km() {
        let meters = haversine_meters(PARIS, LYON);
        assert!((380_000.0..400_000.0).contains(&meters), "got {}", meters);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_meters(PARIS, LYON);
        let ba = haversine_meters(LYON, PARIS);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
    }

    #[test]
    fn bounds_cover_all_points() {
        let result = bounds(&[PARIS, LYON]).unwrap();
        assert_eq!(result.min_lat, LYON.latitude);
        assert_eq!(result.max_lat, PARIS.latitude);
        assert_eq!(result.min_lng, PARIS.longitude);
        assert_eq!(result.max_lng, LYON.longitude);
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(bounds(&[]).is_none());
    }
}
