// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Photometric exposure of the physical camera.
//!
//! The composite pass scales HDR radiance by [`exposure`], derived from the
//! camera's EV100. With adaptive exposure enabled, the averaged scene luminance
//! read back from the histogram passes drives [`apply_auto_exposure`], which
//! picks ISO first and then spreads the remaining error over aperture and
//! shutter speed.

use lumen_core::math::SQRT_2;
use lumen_core::renderer::{
    PhysicalCameraSettings, DEFAULT_APERTURE, DEFAULT_SHUTTER_SPEED, MAX_APERTURE, MAX_ISO,
    MAX_SHUTTER_SPEED, MIN_APERTURE, MIN_ISO, MIN_SHUTTER_SPEED,
};

/// Reflected-light meter calibration constant.
pub const CALIBRATION_CONSTANT: f32 = 12.5;
/// Speed at which the averaged luminance follows the scene, per second.
pub const ADAPTATION_RATE: f32 = 1.1;

/// Exposure value at ISO 100 for the given settings.
#[inline]
pub fn ev100(aperture: f32, shutter_speed: f32, iso: f32) -> f32 {
    (aperture * aperture / shutter_speed * 100.0 / iso).log2()
}

/// The scalar the composite pass multiplies HDR radiance by.
#[inline]
pub fn exposure(ev100: f32) -> f32 {
    1.0 / (1.2 * 2f32.powf(ev100))
}

/// Exposure of a camera, with its settings clamped to their physical ranges first.
pub fn camera_exposure(settings: &PhysicalCameraSettings) -> f32 {
    let clamped = settings.clamped();
    exposure(ev100(clamped.aperture, clamped.shutter_speed, clamped.iso))
}

/// Blend factor of the luminance moving average for a frame of `dt` seconds.
#[inline]
pub fn adaptation_coefficient(dt: f32) -> f32 {
    1.0 - (-dt * ADAPTATION_RATE).exp()
}

/// The exposure value that maps `average_luminance` to middle gray.
///
/// Non-positive and NaN luminances are treated as the smallest positive value.
#[inline]
pub fn target_ev(average_luminance: f32) -> f32 {
    let luminance = average_luminance.max(f32::MIN_POSITIVE);
    (luminance * 100.0 / CALIBRATION_CONSTANT).log2()
}

/// Derives aperture, shutter speed and ISO for the measured scene luminance.
///
/// Starts from the default aperture and shutter speed and solves for ISO. Half
/// of the error left after clamping ISO goes into the aperture and the rest
/// into the shutter speed. Every value ends inside its physical range. The
/// adaptive-exposure flag is left untouched.
pub fn apply_auto_exposure(average_luminance: f32, settings: &mut PhysicalCameraSettings) {
    let target = target_ev(average_luminance);
    let mut aperture = DEFAULT_APERTURE;
    let mut shutter_speed = DEFAULT_SHUTTER_SPEED;

    let iso = (aperture * aperture * 100.0 / (shutter_speed * 2f32.powf(target))).clamp(MIN_ISO, MAX_ISO);

    let ev_difference = target - ev100(aperture, shutter_speed, iso);
    aperture = (aperture * SQRT_2.powf(ev_difference * 0.5)).clamp(MIN_APERTURE, MAX_APERTURE);

    let ev_difference = target - ev100(aperture, shutter_speed, iso);
    shutter_speed = (shutter_speed * 2f32.powf(-ev_difference)).clamp(MIN_SHUTTER_SPEED, MAX_SHUTTER_SPEED);

    settings.aperture = aperture;
    settings.shutter_speed = shutter_speed;
    settings.iso = iso;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn in_range(settings: &PhysicalCameraSettings) -> bool {
        (MIN_APERTURE..=MAX_APERTURE).contains(&settings.aperture)
            && (MIN_SHUTTER_SPEED..=MAX_SHUTTER_SPEED).contains(&settings.shutter_speed)
            && (MIN_ISO..=MAX_ISO).contains(&settings.iso)
    }

    #[test]
    fn default_camera_ev100() {
        // f/16, 1/125 s, ISO 100 is the "sunny 16" exposure.
        let ev = ev100(16.0, 1.0 / 125.0, 100.0);
        assert_relative_eq!(ev, (256.0f32 * 125.0).log2(), epsilon = 1e-4);
        assert_relative_eq!(exposure(ev), 1.0 / (1.2 * 256.0 * 125.0), epsilon = 1e-9);
    }

    #[test]
    fn exposure_falls_as_ev_rises() {
        let base = camera_exposure(&PhysicalCameraSettings::default());
        let brighter = camera_exposure(&PhysicalCameraSettings {
            iso: 200.0,
            ..Default::default()
        });
        // Doubling ISO lowers EV100 by one stop and doubles exposure.
        assert_relative_eq!(brighter / base, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn camera_exposure_clamps_first() {
        let wild = PhysicalCameraSettings {
            iso: 1.0,
            ..Default::default()
        };
        let floor = PhysicalCameraSettings {
            iso: MIN_ISO,
            ..Default::default()
        };
        assert_eq!(camera_exposure(&wild), camera_exposure(&floor));
    }

    #[test]
    fn coefficient_grows_with_dt() {
        assert_eq!(adaptation_coefficient(0.0), 0.0);
        let short = adaptation_coefficient(1.0 / 60.0);
        let long = adaptation_coefficient(1.0);
        assert!(short > 0.0 && short < long && long < 1.0);
        assert_relative_eq!(long, 1.0 - (-1.1f32).exp(), epsilon = 1e-6);
    }

    #[test]
    fn auto_exposure_is_deterministic_and_in_range() {
        for luminance in [0.0, 1e-6, 0.18, 1.0, 125.0, 5_000.0, 1e9, f32::NAN] {
            let mut first = PhysicalCameraSettings::default();
            let mut second = PhysicalCameraSettings {
                aperture: 2.0,
                adaptive_exposure: true,
                ..Default::default()
            };
            apply_auto_exposure(luminance, &mut first);
            apply_auto_exposure(luminance, &mut second);

            assert!(in_range(&first), "{luminance}: {first:?}");
            assert_eq!(first.aperture, second.aperture);
            assert_eq!(first.shutter_speed, second.shutter_speed);
            assert_eq!(first.iso, second.iso);
            assert!(second.adaptive_exposure);
        }
    }

    #[test]
    fn iso_alone_absorbs_moderate_scenes() {
        // L = 12.5 * 2^15 / 100 makes the target EV 15, inside the ISO range.
        let luminance = CALIBRATION_CONSTANT * 2f32.powi(15) / 100.0;
        let mut settings = PhysicalCameraSettings::default();
        apply_auto_exposure(luminance, &mut settings);

        assert_relative_eq!(settings.aperture, DEFAULT_APERTURE, epsilon = 1e-3);
        assert_relative_eq!(settings.shutter_speed, DEFAULT_SHUTTER_SPEED, epsilon = 1e-6);
        assert_relative_eq!(ev100(settings.aperture, settings.shutter_speed, settings.iso), 15.0, epsilon = 1e-3);
    }

    #[test]
    fn dark_scenes_open_up() {
        let mut settings = PhysicalCameraSettings::default();
        apply_auto_exposure(1e-4, &mut settings);
        assert_eq!(settings.iso, MAX_ISO);
        assert!(settings.aperture < DEFAULT_APERTURE);
        assert!(settings.shutter_speed > DEFAULT_SHUTTER_SPEED);
    }
}
