use kmeans_colors::{Sort, get_kmeans};
use log::debug;
use palette::{IntoColor, Lab, Srgb};
use rand::Rng;

use crate::color::{Color, pixel_count};
use crate::error::{PlaceholderError, Result};

/// Number of clusters the dominant color is picked from. Collapsing straight
/// to a single cluster averages everything into mud.
pub const DOMINANT_CLUSTERS: usize = 4;

// Lab k-means tuning
const LAB_MAX_ITERATIONS: usize = 20;
const LAB_CONVERGENCE: f32 = 1e-4;

/// Tuning for [`k_means_clusters`].
#[derive(Clone, Copy, Debug)]
pub struct KMeansOptions {
    /// Palette length. Cost grows linearly with it.
    pub cluster_count: usize,
    /// Pixels drawn (with replacement) before clustering.
    pub sample_size: usize,
    /// Upper bound on assign/update rounds.
    pub max_iterations: usize,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            cluster_count: 8,
            sample_size: 1000,
            max_iterations: 50,
        }
    }
}

/// A converged cluster: its centroid and how many samples ended up in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cluster {
    pub centroid: Color,
    pub members: usize,
}

type Point = [f64; 3];

/// Palette of `cluster_count` colors, most dominant first.
///
/// Uses the thread-local RNG, so results on non-uniform input vary between
/// runs. Use [`get_palette_with_rng`] to pin them.
pub fn get_palette(pixels: &[u8], cluster_count: usize) -> Result<Vec<Color>> {
    get_palette_with_rng(pixels, cluster_count, &mut rand::rng())
}

pub fn get_palette_with_rng<R: Rng + ?Sized>(
    pixels: &[u8],
    cluster_count: usize,
    rng: &mut R,
) -> Result<Vec<Color>> {
    let options = KMeansOptions {
        cluster_count,
        ..KMeansOptions::default()
    };
    let clusters = k_means_clusters(pixels, &options, rng)?;
    Ok(clusters.into_iter().map(|c| c.centroid).collect())
}

/// The most dominant color, e.g. `Srgb::new(255, 0, 0)` for a red image.
pub fn get_dominant_color(pixels: &[u8]) -> Result<Color> {
    get_dominant_color_with_rng(pixels, &mut rand::rng())
}

pub fn get_dominant_color_with_rng<R: Rng + ?Sized>(pixels: &[u8], rng: &mut R) -> Result<Color> {
    let palette = get_palette_with_rng(pixels, DOMINANT_CLUSTERS, rng)?;
    // k_means_clusters always yields cluster_count entries
    palette
        .first()
        .copied()
        .ok_or(PlaceholderError::InvalidClusterCount(DOMINANT_CLUSTERS))
}

/// K-means over a random sample of RGBA `pixels`, in RGB space.
///
/// 1. Draw `sample_size` pixels with replacement.
/// 2. Seed every centroid with a random sample.
/// 3. Assign each sample to its nearest centroid (first one wins ties), then
///    move each centroid to the mean of its members. A cluster left without
///    members keeps its centroid. Stop once nothing moves or after
///    `max_iterations` rounds; at least one round always runs.
///
/// Clusters come back sorted by member count, largest first, ties in
/// cluster order. Empty clusters are kept, so the result always has
/// `cluster_count` entries and may contain duplicate colors.
pub fn k_means_clusters<R: Rng + ?Sized>(
    pixels: &[u8],
    options: &KMeansOptions,
    rng: &mut R,
) -> Result<Vec<Cluster>> {
    if options.cluster_count == 0 {
        return Err(PlaceholderError::InvalidClusterCount(0));
    }
    if options.sample_size == 0 {
        return Err(PlaceholderError::InvalidSampleSize);
    }
    let count = pixel_count(pixels)?;

    let samples: Vec<Point> = (0..options.sample_size)
        .map(|_| {
            let i = rng.random_range(0..count) * 4;
            [pixels[i] as f64, pixels[i + 1] as f64, pixels[i + 2] as f64]
        })
        .collect();

    let initial: Vec<Point> = (0..options.cluster_count)
        .map(|_| samples[rng.random_range(0..samples.len())])
        .collect();

    let (centroids, assignment, iterations) = {
        let mut centroids = initial;
        let mut iterations = 0;
        loop {
            iterations += 1;
            let assignment = assign(&samples, &centroids);
            let next = update_centroids(&samples, &assignment, &centroids);
            if next == centroids || iterations >= options.max_iterations {
                break (next, assignment, iterations);
            }
            centroids = next;
        }
    };
    debug!("k-means converged in {iterations} iterations");

    let mut members = vec![0usize; centroids.len()];
    for &cluster in &assignment {
        members[cluster] += 1;
    }

    let mut clusters: Vec<Cluster> = centroids
        .iter()
        .zip(members)
        .map(|(point, members)| Cluster {
            centroid: to_color(point),
            members,
        })
        .collect();
    // stable, so equal-sized clusters keep their order
    clusters.sort_by(|a, b| b.members.cmp(&a.members));
    Ok(clusters)
}

/// Index of the nearest centroid for every sample.
fn assign(samples: &[Point], centroids: &[Point]) -> Vec<usize> {
    samples
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let dist = distance_sq(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = index;
                }
            }
            best
        })
        .collect()
}

fn update_centroids(samples: &[Point], assignment: &[usize], previous: &[Point]) -> Vec<Point> {
    let mut sums = vec![[0f64; 3]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (point, &cluster) in samples.iter().zip(assignment) {
        let sum = &mut sums[cluster];
        sum[0] += point[0];
        sum[1] += point[1];
        sum[2] += point[2];
        counts[cluster] += 1;
    }

    previous
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(old, (sum, &n))| {
            if n == 0 {
                *old
            } else {
                let n = n as f64;
                [sum[0] / n, sum[1] / n, sum[2] / n]
            }
        })
        .collect()
}

#[inline]
fn distance_sq(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn to_color(point: &Point) -> Color {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Srgb::new(channel(point[0]), channel(point[1]), channel(point[2]))
}

/// Palette clustered in CIE Lab instead of RGB, sorted by pixel share.
///
/// Every opaque pixel takes part, transparent ones are skipped. Slower than
/// [`get_palette`] but closer to how the colors are perceived.
pub fn get_perceptual_palette(pixels: &[u8], cluster_count: usize, seed: u64) -> Result<Vec<Color>> {
    // kmeans_colors stores cluster indices as u8
    if cluster_count == 0 || cluster_count > u8::MAX as usize {
        return Err(PlaceholderError::InvalidClusterCount(cluster_count));
    }
    pixel_count(pixels)?;

    let lab_pixels: Vec<Lab> = pixels
        .chunks_exact(4)
        .filter(|px| px[3] != 0)
        .map(|px| Srgb::new(px[0], px[1], px[2]).into_format::<f32>().into_color())
        .collect();
    if lab_pixels.is_empty() {
        return Err(PlaceholderError::EmptyBuffer);
    }

    let kmeans = get_kmeans(
        cluster_count,
        LAB_MAX_ITERATIONS,
        LAB_CONVERGENCE,
        false,
        &lab_pixels,
        seed,
    );
    let mut sorted = Lab::sort_indexed_colors(&kmeans.centroids, &kmeans.indices);
    sorted.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    Ok(sorted
        .into_iter()
        .map(|data| {
            let rgb: Srgb = data.centroid.into_color();
            rgb.into_format::<u8>()
        })
        .collect())
}
