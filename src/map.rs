//! Loads the Google Maps script on pages with a map and draws the office
//! marker once the API calls back.

use log::info;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Function, Reflect};
use web_sys::{Document, Element, HtmlScriptElement, Window};

use crate::config::{self, MapLocation};
use crate::dom;
use crate::error::Unavailable;

pub const MAP_ELEMENT_ID: &str = "mapWrapper";
pub const CALLBACK_NAME: &str = "initMap";
const MAPS_SCRIPT_BASE: &str = "https://maps.googleapis.com/maps/api/js";

pub fn script_url(api_key: &str, callback: &str) -> String {
    format!(
        "{}?key={}&callback={}",
        MAPS_SCRIPT_BASE,
        urlencoding::encode(api_key),
        urlencoding::encode(callback)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MapOptions {
    center: LatLng,
    zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MarkerOptions<'a> {
    position: LatLng,
    title: &'a str,
}

fn maps_namespace(window: &Window) -> Result<JsValue, JsValue> {
    let google = Reflect::get(window, &JsValue::from_str("google"))?;
    Reflect::get(&google, &JsValue::from_str("maps"))
}

fn construct(namespace: &JsValue, class: &str, args: &Array) -> Result<JsValue, JsValue> {
    let ctor: Function = Reflect::get(namespace, &JsValue::from_str(class))?.dyn_into()?;
    Reflect::construct(&ctor, args)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn draw(window: &Window, wrapper: &Element, location: &MapLocation) -> Result<(), JsValue> {
    let maps = maps_namespace(window)?;
    let center = LatLng {
        lat: location.lat,
        lng: location.lng,
    };

    let options = to_js(&MapOptions {
        center,
        zoom: location.zoom,
    })?;
    let map = construct(&maps, "Map", &Array::of2(wrapper, &options))?;

    let marker = to_js(&MarkerOptions {
        position: center,
        title: &location.title,
    })?;
    Reflect::set(&marker, &JsValue::from_str("map"), &map)?;
    construct(&maps, "Marker", &Array::of1(&marker))?;
    Ok(())
}

/// Marker for a page whose map script has been requested.
pub struct MapLoader;

pub fn mount(
    window: &Window,
    document: &Document,
    location: &MapLocation,
) -> Result<MapLoader, Unavailable> {
    let wrapper = dom::require_id(document, MAP_ELEMENT_ID)?;
    let head = document.head().ok_or(Unavailable::MissingElement("head"))?;

    let init = {
        let window = window.clone();
        let location = location.clone();
        Closure::<dyn Fn()>::new(move || {
            if let Err(e) = draw(&window, &wrapper, &location) {
                gloo_console::error!("Failed to draw map", e);
            }
        })
    };
    Reflect::set(window, &JsValue::from_str(CALLBACK_NAME), init.as_ref())?;
    init.forget();

    let script = document
        .create_element("script")?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| Unavailable::Dom("script element".to_string()))?;
    let src = script_url(config::get_maps_api_key(), CALLBACK_NAME);
    script.set_src(&src);
    script.set_async(true);
    script.set_defer(true);
    head.append_child(&script)?;

    info!("Loading map script for {}", location.title);
    Ok(MapLoader)
}
