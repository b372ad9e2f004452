use chrono::{DateTime, Utc};
use skyfare_domain::{Itinerary, Segment};

use crate::views::{FlightOption, LayoverView, Leg, Price, SegmentView};

fn minutes(dt: DateTime<Utc>) -> i64 {
    dt.timestamp() / 60
}

/// Find the index `i` such that outbound = `segs[..=i]` and return =
/// `segs[i + 1..]`. Among adjacent airport-continuous pairs with a
/// positive gap, the pair with the LARGEST gap wins: that gap is the
/// stay at the far end of a round trip, which dwarfs ordinary same-leg
/// layovers. Returns `None` when no eligible boundary exists.
pub fn find_turnaround_split(segs: &[Segment]) -> Option<usize> {
    if segs.len() < 2 {
        return None;
    }

    let mut best: Option<(usize, i64)> = None;
    for i in 0..segs.len() - 1 {
        let (a, b) = (&segs[i], &segs[i + 1]);
        if a.destination() != b.origin() {
            // not contiguous at the same airport
            continue;
        }
        let gap = minutes(b.departure_utc()) - minutes(a.arrival_utc());
        if gap <= 0 {
            continue;
        }
        // largest gap wins; ties keep the earliest boundary
        match best {
            Some((_, g)) if g >= gap => {}
            _ => best = Some((i, gap)),
        }
    }
    best.map(|(i, _)| i)
}

/// Build a single leg (summary + segments + layovers) from contiguous
/// segments. Layovers are recorded only between airport-continuous
/// segments with a positive gap; the leg duration is the segment sum
/// plus the in-leg layover sum.
pub fn build_leg(leg_segs: &[Segment]) -> Leg {
    let origin = leg_segs[0].origin().to_string();
    let destination = leg_segs[leg_segs.len() - 1].destination().to_string();
    let depart_utc = leg_segs[0].departure_utc();
    let arrive_utc = leg_segs[leg_segs.len() - 1].arrival_utc();

    let mut seg_total = 0;
    let mut segments = Vec::with_capacity(leg_segs.len());
    for s in leg_segs {
        let duration = minutes(s.arrival_utc()) - minutes(s.departure_utc());
        segments.push(SegmentView {
            origin: s.origin().to_string(),
            destination: s.destination().to_string(),
            depart_utc: s.departure_utc().to_rfc3339(),
            arrive_utc: s.arrival_utc().to_rfc3339(),
            carrier: s.carrier().to_string(),
            flight_number: s.flight_number().to_string(),
            duration_min: duration,
        });
        seg_total += duration;
    }

    let mut lay_total = 0;
    let mut layovers = Vec::new();
    for pair in leg_segs.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.destination() == b.origin() {
            let gap = minutes(b.departure_utc()) - minutes(a.arrival_utc());
            if gap > 0 {
                layovers.push(LayoverView {
                    at: a.destination().to_string(),
                    duration_min: gap,
                });
                lay_total += gap;
            }
        }
    }

    Leg {
        origin,
        destination,
        depart_utc: depart_utc.to_rfc3339(),
        arrive_utc: arrive_utc.to_rfc3339(),
        duration_min: seg_total + lay_total,
        stops: leg_segs.len().saturating_sub(1),
        segments,
        layovers,
    }
}

/// Transform a raw [`Itinerary`] into its trip projection:
/// - detect the turnaround (outbound vs return) via the largest gap at
///   a contiguous airport;
/// - build legs with proper origin/destination, segments, layovers and
///   durations;
/// - never count the multi-day stay between legs as a layover.
///
/// Upstream data is noisy, so every ambiguous or invalid split degrades
/// to a one-way classification instead of failing. Segments are assumed
/// chronologically ordered by the caller.
pub fn to_trip_option(it: &Itinerary) -> FlightOption {
    let segs = it.segments();
    let home = segs[0].origin().clone();

    let mut carriers: Vec<String> = Vec::new();
    for s in segs {
        if !carriers.iter().any(|c| c == s.carrier()) {
            carriers.push(s.carrier().to_string());
        }
    }

    let price = Price {
        amount: it.price().amount(),
        currency: it.price().currency().to_string(),
    };
    let deeplink = it.deeplink().map(str::to_string);

    let one_way = |price: Price, deeplink: Option<String>, carriers: Vec<String>| FlightOption {
        price,
        deeplink,
        carriers,
        outbound: build_leg(segs),
        return_leg: None,
    };

    // itinerary never returns home -> one-way outright
    if segs[segs.len() - 1].destination() != &home {
        return one_way(price, deeplink, carriers);
    }

    let mut split = find_turnaround_split(segs);

    if split.is_none() {
        // fallback heuristic: first boundary where the left part leaves
        // home without coming back and the right part ends at home
        for i in 0..segs.len() - 1 {
            let (left, right) = segs.split_at(i + 1);
            if left[0].origin() == &home
                && left[left.len() - 1].destination() != &home
                && right[right.len() - 1].destination() == &home
            {
                split = Some(i);
                break;
            }
        }
    }

    let split = match split {
        Some(i) if i < segs.len() - 1 => i,
        _ => return one_way(price, deeplink, carriers),
    };

    let outbound_segs = &segs[..=split];
    let return_segs = &segs[split + 1..];

    // reject "looping" splits; fall back to the safer one-way shape
    let valid = outbound_segs[0].origin() == &home
        && return_segs[return_segs.len() - 1].destination() == &home
        && outbound_segs[outbound_segs.len() - 1].destination() == return_segs[0].origin()
        && minutes(return_segs[0].departure_utc())
            > minutes(outbound_segs[outbound_segs.len() - 1].arrival_utc());
    if !valid {
        return one_way(price, deeplink, carriers);
    }

    FlightOption {
        price,
        deeplink,
        carriers,
        outbound: build_leg(outbound_segs),
        return_leg: Some(build_leg(return_segs)),
    }
}

pub fn to_trip_options(itineraries: &[Itinerary]) -> Vec<FlightOption> {
    itineraries.iter().map(to_trip_option).collect()
}
