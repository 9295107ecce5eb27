pub mod errors;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::{NaiveDate, Utc};
use glob::glob;
use log::{info, warn};
use sha2::{Digest, Sha256};
use ureq::Agent;
use crate::config::Location;
use crate::manager_gridded::errors::GriddedError;
use crate::manager_nws::USER_AGENT;
use crate::retry;
use crate::stop::StopSignal;

const HRRR_ROOT: &str = "https://nomads.ncep.noaa.gov/pub/data/nccf/com/hrrr/prod";
const NBM_ROOT: &str = "https://nomads.ncep.noaa.gov/pub/data/nccf/com/blend/prod";
const HRRR_FILTER: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_hrrr_2d.pl";
const NBM_FILTER: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_blend.pl";

const HRRR_VARS: [&str; 6] = ["APCP", "ASNOW", "CRAIN", "CSNOW", "CICEP", "CFRZR"];
const NBM_VARS: [&str; 4] = ["APCP", "ASNOW", "FICEAC", "PTYPE"];
const LEVELS: [&str; 1] = ["surface"];

const HRRR_HOURS: std::ops::Range<u32> = 0..19;
const NBM_HOURS: std::ops::Range<u32> = 1..37;

const PADDING_KM: f64 = 50.0;
const REQUEST_DELAY: Duration = Duration::from_secs(10);
const CACHE_MAX_AGE_DAYS: i64 = 3;

/// Geographic bounding box in degrees, used to subset the model files
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BBox {
    /// Returns the box covering the given (lat, lon) points with a padding
    /// margin on every side. Longitude padding is widened by latitude so the
    /// margin stays roughly the same distance on the ground.
    ///
    /// # Arguments
    ///
    /// * 'points' - the (lat, lon) pairs to cover
    /// * 'padding_km' - margin in kilometers added on each side
    pub fn from_points(points: &[(f64, f64)], padding_km: f64) -> BBox {
        let mut top = f64::MIN;
        let mut bottom = f64::MAX;
        let mut left = f64::MAX;
        let mut right = f64::MIN;

        for &(lat, lon) in points {
            top = top.max(lat);
            bottom = bottom.min(lat);
            left = left.min(lon);
            right = right.max(lon);
        }

        let mid_lat = (top + bottom) / 2.0;
        let pad_lat = padding_km / 111.0;
        let pad_lon = padding_km / (111.0 * mid_lat.to_radians().cos().max(0.1));

        BBox {
            left: left - pad_lon,
            right: right + pad_lon,
            top: (top + pad_lat).min(90.0),
            bottom: (bottom - pad_lat).max(-90.0),
        }
    }

    fn tag(&self) -> String {
        stable_tag(
            &format!("{:.4}_{:.4}_{:.4}_{:.4}", self.left, self.right, self.top, self.bottom),
            8,
        )
    }
}

/// A model run identified by date directory and cycle hour
#[derive(Debug, PartialEq)]
struct Cycle {
    date: String,
    hour: u32,
}

/// Downloader keeping a local cache of subset HRRR and NBM model files
pub struct Gridded {
    agent: Agent,
    cache_dir: PathBuf,
    bbox: BBox,
    bbox_tag: String,
    hrrr_tag: String,
    nbm_tag: String,
}

impl Gridded {
    /// Returns a new gridded model cache manager covering all configured
    /// locations
    ///
    /// # Arguments
    ///
    /// * 'cache_dir' - root directory for the local grib cache
    /// * 'locations' - the configured locations to cover
    pub fn new(cache_dir: &str, locations: &[Location]) -> Gridded {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(120)))
            .build();

        let points: Vec<(f64, f64)> = locations.iter().map(|l| (l.lat, l.lon)).collect();
        let bbox = BBox::from_points(&points, PADDING_KM);
        let bbox_tag = bbox.tag();

        Gridded {
            agent: config.into(),
            cache_dir: PathBuf::from(cache_dir),
            bbox,
            bbox_tag,
            hrrr_tag: var_tag(&HRRR_VARS),
            nbm_tag: var_tag(&NBM_VARS),
        }
    }

    /// Brings the cache up to date with the latest HRRR and NBM cycles and
    /// prunes files older than the retention window. Returns the number of
    /// files downloaded. Stops early, without error, when the stop signal
    /// is raised.
    ///
    /// # Arguments
    ///
    /// * 'stop' - signal checked between downloads
    pub fn sync(&self, stop: &StopSignal) -> Result<usize, GriddedError> {
        let mut downloaded: usize = 0;

        let hrrr = self.latest_hrrr_cycle()?;
        info!("latest hrrr cycle: {} t{:02}z", hrrr.date, hrrr.hour);
        for fhr in HRRR_HOURS {
            if stop.is_signalled() {
                return Ok(downloaded);
            }

            let dir = format!("/hrrr.{}/conus", hrrr.date);
            let file = format!("hrrr.t{:02}z.wrfsfcf{:02}.grib2", hrrr.hour, fhr);
            let url = filter_url(HRRR_FILTER, &dir, &file, &HRRR_VARS, &self.bbox);
            let out = self.cache_dir.join(format!(
                "hrrr/{}/t{:02}/hrrr_{}_t{:02}_f{:02}_{}_{}.grib2",
                hrrr.date, hrrr.hour, hrrr.date, hrrr.hour, fhr, self.bbox_tag, self.hrrr_tag
            ));

            if self.sync_file(&url, &out, stop)? {
                downloaded += 1;
            }
        }

        let nbm = self.latest_nbm_cycle()?;
        info!("latest nbm cycle: {} t{:02}z", nbm.date, nbm.hour);
        for fhr in NBM_HOURS {
            if stop.is_signalled() {
                return Ok(downloaded);
            }

            let dir = format!("/blend.{}/{:02}/core", nbm.date, nbm.hour);
            let file = format!("blend.t{:02}z.core.f{:03}.co.grib2", nbm.hour, fhr);
            let url = filter_url(NBM_FILTER, &dir, &file, &NBM_VARS, &self.bbox);
            let out = self.cache_dir.join(format!(
                "nbm/{}/t{:02}/nbm_{}_t{:02}_f{:03}_{}_{}.grib2",
                nbm.date, nbm.hour, nbm.date, nbm.hour, fhr, self.bbox_tag, self.nbm_tag
            ));

            if self.sync_file(&url, &out, stop)? {
                downloaded += 1;
            }
        }

        self.prune_cache()?;

        Ok(downloaded)
    }

    /// Downloads one file unless it is already cached. Waits out the polite
    /// delay after every network attempt, successful or not, and logs a
    /// warning instead of failing when a single file cannot be fetched.
    /// Returns whether a download happened.
    ///
    /// # Arguments
    ///
    /// * 'url' - the subset filter url
    /// * 'out' - the cache path for the file
    /// * 'stop' - signal used to cut the delay short
    fn sync_file(&self, url: &str, out: &Path, stop: &StopSignal) -> Result<bool, GriddedError> {
        if fs::metadata(out).map(|m| m.len() > 0).unwrap_or(false) {
            return Ok(false);
        }

        let downloaded = match retry!(stop, || self.download(url, out)) {
            Ok(()) => true,
            Err(e) => {
                warn!("giving up on {:?}: {}", out.file_name().unwrap_or_default(), e);
                false
            }
        };

        stop.wait_for(REQUEST_DELAY);

        Ok(downloaded)
    }

    /// Streams a download to a .part file and renames it into place so an
    /// interrupted transfer never leaves a partial file under the final name
    fn download(&self, url: &str, out: &Path) -> Result<(), GriddedError> {
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }

        let part = out.with_extension("grib2.part");
        match self.stream_to(url, &part) {
            Ok(()) => {
                fs::rename(&part, out)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }

    fn stream_to(&self, url: &str, path: &Path) -> Result<(), GriddedError> {
        let mut res = self.agent.get(url).header("User-Agent", USER_AGENT).call()?;
        let mut file = File::create(path)?;
        io::copy(&mut res.body_mut().as_reader(), &mut file)?;

        Ok(())
    }

    /// Returns the newest HRRR cycle that has published its first surface file
    fn latest_hrrr_cycle(&self) -> Result<Cycle, GriddedError> {
        let listing = self.fetch_listing(&format!("{}/", HRRR_ROOT))?;
        let mut dates: Vec<String> = list_hrefs(&listing)
            .iter()
            .filter_map(|h| date_dir(h, "hrrr."))
            .collect();
        dates.sort();

        for date in dates.iter().rev() {
            let listing = self.fetch_listing(&format!("{}/hrrr.{}/conus/", HRRR_ROOT, date))?;
            let hour = list_hrefs(&listing)
                .iter()
                .filter_map(|h| {
                    h.strip_prefix("hrrr.t")?
                        .strip_suffix("z.wrfsfcf00.grib2")?
                        .parse::<u32>()
                        .ok()
                })
                .max();

            if let Some(hour) = hour {
                return Ok(Cycle { date: date.clone(), hour });
            }
        }

        Err(GriddedError("no hrrr cycle available".to_string()))
    }

    /// Returns the newest NBM cycle whose core directory has forecast files
    fn latest_nbm_cycle(&self) -> Result<Cycle, GriddedError> {
        let listing = self.fetch_listing(&format!("{}/", NBM_ROOT))?;
        let mut dates: Vec<String> = list_hrefs(&listing)
            .iter()
            .filter_map(|h| date_dir(h, "blend."))
            .collect();
        dates.sort();

        for date in dates.iter().rev() {
            let listing = self.fetch_listing(&format!("{}/blend.{}/", NBM_ROOT, date))?;
            let mut hours: Vec<u32> = list_hrefs(&listing)
                .iter()
                .filter_map(|h| {
                    let h = h.trim_end_matches('/');
                    if h.len() == 2 { h.parse::<u32>().ok() } else { None }
                })
                .collect();
            hours.sort();

            for hour in hours.iter().rev() {
                let url = format!("{}/blend.{}/{:02}/core/", NBM_ROOT, date, hour);
                let listing = self.fetch_listing(&url)?;
                let prefix = format!("blend.t{:02}z.core.f", hour);
                let published = list_hrefs(&listing).iter().any(|h| {
                    h.strip_prefix(prefix.as_str())
                        .and_then(|rest| rest.strip_suffix(".co.grib2"))
                        .map(|fhr| fhr.len() == 3 && fhr.bytes().all(|b| b.is_ascii_digit()))
                        .unwrap_or(false)
                });

                if published {
                    return Ok(Cycle { date: date.clone(), hour: *hour });
                }
            }
        }

        Err(GriddedError("no nbm cycle available".to_string()))
    }

    fn fetch_listing(&self, url: &str) -> Result<String, GriddedError> {
        let body = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(body)
    }

    /// Removes cached files, partial downloads included, whose embedded cycle
    /// date is older than the retention window
    fn prune_cache(&self) -> Result<(), GriddedError> {
        let cutoff = Utc::now().date_naive() - chrono::Duration::days(CACHE_MAX_AGE_DAYS);
        let pattern = format!("{}/**/*.grib2*", self.cache_dir.display());

        for path in glob(&pattern)?.flatten() {
            let date = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.split('_').nth(1))
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

            if let Some(date) = date {
                if date < cutoff {
                    info!("pruning {:?}", path.file_name().unwrap_or_default());
                    let _ = fs::remove_file(&path);
                }
            }
        }

        Ok(())
    }
}

/// Builds the subset filter url for one model file
///
/// # Arguments
///
/// * 'filter' - the cgi-bin filter endpoint
/// * 'dir' - the model directory parameter
/// * 'file' - the model file name
/// * 'vars' - the grib variables to keep
/// * 'bbox' - the subregion to cut out
fn filter_url(filter: &str, dir: &str, file: &str, vars: &[&str], bbox: &BBox) -> String {
    let mut url = format!(
        "{}?dir={}&file={}&subregion=&leftlon={:.6}&rightlon={:.6}&toplat={:.6}&bottomlat={:.6}",
        filter, dir, file, bbox.left, bbox.right, bbox.top, bbox.bottom
    );
    for lev in LEVELS {
        url.push_str(&format!("&lev_{}=on", lev));
    }
    for var in vars {
        url.push_str(&format!("&var_{}=on", var));
    }

    url
}

/// Short tag identifying a variable and level selection, so files cached for
/// one selection are not mistaken for another
fn var_tag(vars: &[&str]) -> String {
    let mut parts: Vec<String> = vars.iter().map(|v| v.to_string()).collect();
    parts.extend(LEVELS.iter().map(|l| format!("lev:{}", l)));
    parts.sort();

    stable_tag(&parts.join(","), 8)
}

fn stable_tag(input: &str, n: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut tag = digest.iter().map(|x| format!("{:02x}", x)).collect::<String>();
    tag.truncate(n);

    tag
}

/// Extracts an eight digit date from a directory href like "hrrr.20260830/"
fn date_dir(href: &str, prefix: &str) -> Option<String> {
    let date = href.trim_end_matches('/').strip_prefix(prefix)?;
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        Some(date.to_string())
    } else {
        None
    }
}

/// Extracts the href targets from a directory listing page
fn list_hrefs(body: &str) -> Vec<&str> {
    let mut hrefs = Vec::new();
    let mut rest = body;
    while let Some(i) = rest.find("href=\"") {
        rest = &rest[i + 6..];
        if let Some(end) = rest.find('"') {
            hrefs.push(&rest[..end]);
            rest = &rest[end..];
        } else {
            break;
        }
    }

    hrefs
}
