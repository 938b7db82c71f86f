//! Kakao Local keyword geocoding.
//!
//! Free-text place queries are messy ("부산 광안리 근처 가성비 카페 추천"),
//! so a single keyword search is not enough. [`KakaoLocal::geocode`] fans a
//! query out over several search strategies, scores every candidate the API
//! returns, and picks the best one; [`KakaoLocal::lookup`] is the cheap
//! single-shot variant used when attaching coordinates to already-extracted
//! place names. Both fall back to static region / place-type tables so a
//! caller always gets a usable coordinate, network or not.

use serde::Deserialize;
use tracing::{debug, warn};

use gil_types::{Geocode, coords};

use crate::error::ProviderError;
use crate::similarity;

const KEYWORD_SEARCH_URL: &str = "https://dapi.kakao.com/v2/local/search/keyword.json";

/// Words that carry no location signal in a query.
const STOPWORDS: [&str; 14] = [
    "추천", "일정", "시간", "도착", "출발", "점심", "저녁", "식사", "활동", "옵션", "여행",
    "코스", "계획", "그럼",
];

const CAFE_KEYWORDS: [&str; 4] = ["카페", "커피", "coffee", "cafe"];
const RESTAURANT_KEYWORDS: [&str; 7] =
    ["식당", "맛집", "레스토랑", "음식점", "국밥", "냉면", "김치찌개"];
const TOURIST_KEYWORDS: [&str; 8] =
    ["관광지", "명소", "공원", "박물관", "미술관", "산", "해변", "바다"];

/// Region names recognised inside queries. `제주도` precedes `제주` so the
/// longer form wins when both occur.
const REGIONS: [&str; 13] = [
    "부산", "서울", "제주도", "제주", "경주", "강릉", "대구", "인천", "광주", "대전", "울산",
    "해운대", "광안리",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceKind {
    Cafe,
    Restaurant,
    Tourist,
    Other,
}

// ── Wire types ────────────────────────────────────────────────────────────────

/// One document of a keyword-search response. Kakao serialises coordinates
/// as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KakaoDocument {
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub address_name: String,
    #[serde(default)]
    pub road_address_name: String,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
}

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    #[serde(default)]
    documents: Vec<KakaoDocument>,
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KakaoLocal {
    http: reqwest::Client,
    api_key: String,
}

impl KakaoLocal {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self { http, api_key: api_key.into() }
    }

    async fn keyword_search(
        &self,
        query: &str,
        size: u8,
        sort_accuracy: bool,
    ) -> Result<Vec<KakaoDocument>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingKey("Kakao"));
        }
        let mut params: Vec<(&str, String)> =
            vec![("query", query.to_owned()), ("size", size.to_string())];
        if sort_accuracy {
            params.push(("sort", "accuracy".to_owned()));
        }
        let resp = self
            .http
            .get(KEYWORD_SEARCH_URL)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let parsed: KeywordSearchResponse = resp.json().await?;
        Ok(parsed.documents)
    }

    /// Multi-strategy scored geocode.
    ///
    /// Returns `None` only when no API key is configured; with a key, the
    /// fallback tables guarantee an answer.
    pub async fn geocode(&self, query: &str) -> Option<Geocode> {
        if self.api_key.is_empty() {
            debug!("kakao key unset; skipping geocode");
            return None;
        }

        let cleaned = clean_query(query);
        let kind = place_kind(query);
        let region = detect_region(query);
        let strategies = search_strategies(query, &cleaned, kind, region);
        debug!(?strategies, %query, "geocode strategies");

        let mut best: Option<(i32, Geocode)> = None;
        for term in &strategies {
            let docs = match self.keyword_search(term, 20, true).await {
                Ok(docs) => docs,
                Err(e) => {
                    warn!(term = %term, error = %e, "keyword search failed");
                    continue;
                }
            };
            for doc in docs {
                let Some(score) = score_document(&doc, &cleaned, kind, region) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(s, _)| score > *s) {
                    let address = if doc.road_address_name.is_empty() {
                        doc.address_name.clone()
                    } else {
                        doc.road_address_name.clone()
                    };
                    best = Some((
                        score,
                        Geocode {
                            lat: doc.y.parse().unwrap_or(0.0),
                            lng: doc.x.parse().unwrap_or(0.0),
                            address,
                            place_name: doc.place_name,
                            category: doc.category_name,
                            search_query: term.clone(),
                            score,
                        },
                    ));
                }
            }
        }

        match best {
            Some((score, mut hit)) if score > 10 => {
                let (lat, lng) = pin_known_coordinates(&hit.place_name, &hit.address, hit.lat, hit.lng);
                hit.lat = lat;
                hit.lng = lng;
                debug!(place = %hit.place_name, score, "geocode hit");
                Some(hit)
            }
            _ => {
                debug!(%query, "no confident candidate; using backup tables");
                Some(backup_geocode(&cleaned))
            }
        }
    }

    /// Single-shot coordinate lookup for an already-extracted place name.
    ///
    /// The static region table answers first; otherwise the first keyword hit
    /// wins, and any API trouble falls through to the backup tables. `None`
    /// only when the key is unset and no table matched.
    pub async fn lookup(&self, place_name: &str) -> Option<Geocode> {
        let name = place_name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(hit) = region_fallback(name) {
            return Some(hit);
        }
        if self.api_key.is_empty() {
            debug!("kakao key unset; skipping lookup");
            return None;
        }
        match self.keyword_search(name, 30, false).await {
            Ok(docs) => match docs.into_iter().next() {
                Some(doc) => {
                    let address = if doc.road_address_name.is_empty() {
                        doc.address_name
                    } else {
                        doc.road_address_name
                    };
                    Some(Geocode {
                        lat: doc.y.parse().unwrap_or(0.0),
                        lng: doc.x.parse().unwrap_or(0.0),
                        address,
                        place_name: doc.place_name,
                        category: doc.category_name,
                        search_query: name.to_owned(),
                        score: 80,
                    })
                }
                None => Some(backup_geocode(name)),
            },
            Err(e) => {
                warn!(place = %name, error = %e, "lookup failed; using backup tables");
                Some(backup_geocode(name))
            }
        }
    }
}

// ── Query cleaning ────────────────────────────────────────────────────────────

/// Strip punctuation, stopwords and single-character tokens from a query.
pub fn clean_query(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || ('가'..='힣').contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(t) && t.chars().count() > 1)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a place-details request ("경복궁 근처 맛집 5곳 알려줘") to the bare
/// place name.
pub fn clean_place_query(text: &str) -> String {
    const REMOVE_WORDS: [&str; 20] = [
        "근처", "추천", "정보", "상세", "맛집", "카페", "식당", "레스토랑", "해줘", "알려줘",
        "보여줘", "찾아줘", "검색해줘", "개", "곳", "군데", "어디", "뭐가", "뭐", "좀",
    ];
    let mut cleaned: String = text.chars().filter(|c| !c.is_ascii_digit()).collect();
    for word in REMOVE_WORDS {
        cleaned = cleaned.replace(word, "");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Strategy construction ─────────────────────────────────────────────────────

fn place_kind(query: &str) -> PlaceKind {
    let q = query.to_lowercase();
    if CAFE_KEYWORDS.iter().any(|k| q.contains(k)) {
        PlaceKind::Cafe
    } else if RESTAURANT_KEYWORDS.iter().any(|k| q.contains(k)) {
        PlaceKind::Restaurant
    } else if TOURIST_KEYWORDS.iter().any(|k| q.contains(k)) {
        PlaceKind::Tourist
    } else {
        PlaceKind::Other
    }
}

fn detect_region(query: &str) -> Option<&'static str> {
    REGIONS.iter().find(|r| query.contains(*r)).copied()
}

fn search_strategies(
    query: &str,
    cleaned: &str,
    kind: PlaceKind,
    region: Option<&'static str>,
) -> Vec<String> {
    let mut strategies = Vec::new();

    if let Some(region) = region {
        strategies.push(format!("{region} {cleaned}"));
        strategies.push(format!("{cleaned} {region}"));
    }

    let with_region = |suffix: &str| match region {
        Some(region) => format!("{region} {suffix}"),
        None => suffix.to_owned(),
    };
    match kind {
        PlaceKind::Cafe => {
            strategies.push(with_region("카페"));
            strategies.push(with_region("커피"));
            strategies.push(format!("{cleaned} 카페"));
            strategies.push(format!("{cleaned} 커피"));
        }
        PlaceKind::Restaurant => {
            strategies.push(with_region("맛집"));
            strategies.push(with_region("식당"));
            strategies.push(format!("{cleaned} 맛집"));
            strategies.push(format!("{cleaned} 식당"));
        }
        PlaceKind::Tourist => {
            strategies.push(with_region("관광지"));
            strategies.push(with_region("명소"));
            strategies.push(format!("{cleaned} 관광지"));
            strategies.push(format!("{cleaned} 명소"));
        }
        PlaceKind::Other => {}
    }

    strategies.push(cleaned.to_owned());
    strategies.push(query.to_owned());

    let char_count = cleaned.chars().count();
    if char_count > 2 {
        strategies.push(cleaned.chars().take(char_count / 2).collect());
        if let Some(first) = cleaned.split_whitespace().next() {
            if cleaned.contains(' ') {
                strategies.push(first.to_owned());
            }
        }
    }

    strategies.retain(|s| !s.trim().is_empty());
    strategies
}

// ── Candidate scoring ─────────────────────────────────────────────────────────

/// Score one keyword-search document against the cleaned query.
///
/// Returns `None` for candidates whose coordinates fall outside Korea (or
/// outside the region the query names); those are unusable no matter how well
/// the name matches.
fn score_document(
    doc: &KakaoDocument,
    cleaned: &str,
    kind: PlaceKind,
    region: Option<&'static str>,
) -> Option<i32> {
    let name_lower = doc.place_name.to_lowercase();
    let query_lower = cleaned.to_lowercase();
    let mut score = 0i32;

    // Name accuracy dominates everything else.
    if name_lower == query_lower {
        score += 100;
    } else if !query_lower.is_empty() && name_lower.contains(&query_lower) {
        score += 80;
    } else if !name_lower.is_empty() && query_lower.contains(&name_lower) {
        score += 70;
    } else {
        score += (similarity::ratio(&query_lower, &name_lower) * 50.0) as i32;
    }

    match kind {
        PlaceKind::Cafe => {
            if ["카페", "커피", "음식점"].iter().any(|k| doc.category_name.contains(k)) {
                score += 30;
            }
            if name_lower.contains("카페") || name_lower.contains("커피") {
                score += 25;
            }
            if doc.address_name.contains("카페") || doc.address_name.contains("커피") {
                score += 15;
            }
        }
        PlaceKind::Restaurant => {
            if doc.category_name.contains("음식점") || doc.category_name.contains("식당") {
                score += 30;
            }
            if RESTAURANT_KEYWORDS.iter().any(|k| name_lower.contains(k)) {
                score += 25;
            }
        }
        PlaceKind::Tourist => {
            if doc.category_name.contains("관광") || doc.category_name.contains("명소") {
                score += 30;
            }
            if TOURIST_KEYWORDS.iter().any(|k| name_lower.contains(k)) {
                score += 25;
            }
        }
        PlaceKind::Other => {}
    }

    if let Some(region) = region {
        if doc.address_name.contains(region) || doc.road_address_name.contains(region) {
            score += 20;
        }
        if doc.place_name.contains(region) {
            score += 15;
        }
    }

    if doc.category_name.contains("관광") || doc.category_name.contains("명소") {
        score += 10;
    } else if doc.category_name.contains("음식점") || doc.category_name.contains("카페") {
        score += 8;
    } else if doc.category_name.contains("산") || doc.category_name.contains("공원") {
        score += 5;
    }

    if let Some(region) = region {
        if doc.address_name.contains(region) {
            score += 10;
        }
    }

    let lat: f64 = doc.y.parse().unwrap_or(0.0);
    let lng: f64 = doc.x.parse().unwrap_or(0.0);
    let name_and_address = format!("{} {}", doc.place_name, doc.address_name);
    if coords::plausible_for(&name_and_address, lat, lng) {
        score += 10;
    } else {
        return None;
    }

    if kind == PlaceKind::Cafe {
        if in_urban_area(lat, lng) {
            score += 20;
        } else {
            score -= 10;
        }
    }

    Some(score)
}

/// City boxes where a café hit is believable.
fn in_urban_area(lat: f64, lng: f64) -> bool {
    ((35.0..=35.5).contains(&lat) && (128.5..=129.5).contains(&lng))  // 부산
        || ((37.4..=37.7).contains(&lat) && (126.8..=127.2).contains(&lng))  // 서울
        || ((33.0..=33.5).contains(&lat) && (126.0..=126.5).contains(&lng))  // 제주
        || ((35.7..=36.0).contains(&lat) && (128.4..=128.8).contains(&lng))  // 대구
        || ((37.4..=37.6).contains(&lat) && (126.4..=126.8).contains(&lng)) // 인천
}

/// Korean geocoders habitually place 유달산 on the wrong peak.
fn pin_known_coordinates(place_name: &str, address: &str, lat: f64, lng: f64) -> (f64, f64) {
    if place_name.contains("유달산") && address.contains("목포") {
        (34.786800, 126.415300)
    } else {
        (lat, lng)
    }
}

// ── Offline fallback tables ───────────────────────────────────────────────────

const REGION_TABLE: [(&[&str], f64, f64, &str); 13] = [
    (&["서울", "강남", "홍대", "명동"], 37.5665, 126.9780, "서울특별시"),
    (&["부산", "해운대", "광안리"], 35.1796, 129.0756, "부산광역시"),
    (&["제주"], 33.4996, 126.5312, "제주특별자치도"),
    (&["경주"], 35.8562, 129.2247, "경상북도 경주시"),
    (&["강릉"], 37.7519, 128.8761, "강원도 강릉시"),
    (&["춘천"], 37.8813, 127.7298, "강원도 춘천시"),
    (&["청평"], 37.7333, 127.4167, "경기도 가평군 청평면"),
    (&["양양"], 38.0706, 128.6280, "강원특별자치도 양양군"),
    (&["대구"], 35.8714, 128.6014, "대구광역시"),
    (&["인천"], 37.4563, 126.7052, "인천광역시"),
    (&["광주"], 35.1596, 126.8526, "광주광역시"),
    (&["대전"], 36.3504, 127.3845, "대전광역시"),
    (&["울산"], 35.5384, 129.3114, "울산광역시"),
];

const PLACE_TYPE_TABLE: [(&[&str], f64, f64, &str); 10] = [
    (&["궁", "궁궐"], 37.5796, 126.9770, "궁궐 지역"),
    (&["사", "절", "사찰"], 35.7894, 129.3319, "사찰 지역"),
    (&["해수욕장", "해변"], 35.1596, 129.1606, "해수욕장 지역"),
    (&["산", "봉"], 33.3617, 126.5292, "산 지역"),
    (&["공원"], 37.5665, 126.9780, "공원 지역"),
    (&["시장"], 35.1796, 129.0756, "시장 지역"),
    (&["맛집", "식당", "카페"], 37.5665, 126.9780, "맛집 지역"),
    (&["타워", "빌딩"], 37.5512, 126.9882, "타워 지역"),
    (&["박물관", "미술관"], 37.5665, 126.9780, "박물관 지역"),
    (&["역", "공항"], 37.5665, 126.9780, "교통시설 지역"),
];

/// Anchor coordinate for a place name that mentions a known region.
pub fn region_fallback(place_name: &str) -> Option<Geocode> {
    let lower = place_name.to_lowercase();
    REGION_TABLE
        .iter()
        .find(|(keys, ..)| keys.iter().any(|k| lower.contains(k)))
        .map(|(_, lat, lng, address)| Geocode {
            lat: *lat,
            lng: *lng,
            address: (*address).to_owned(),
            place_name: place_name.to_owned(),
            category: "AI감지".to_owned(),
            search_query: place_name.to_owned(),
            score: 50,
        })
}

fn place_type_fallback(place_name: &str) -> Option<Geocode> {
    let lower = place_name.to_lowercase();
    PLACE_TYPE_TABLE
        .iter()
        .find(|(keys, ..)| keys.iter().any(|k| lower.contains(k)))
        .map(|(_, lat, lng, address)| Geocode {
            lat: *lat,
            lng: *lng,
            address: (*address).to_owned(),
            place_name: place_name.to_owned(),
            category: "AI감지".to_owned(),
            search_query: place_name.to_owned(),
            score: 40,
        })
}

fn smart_backup(place_name: &str) -> Geocode {
    const SMART_TABLE: [(&[&str], f64, f64, &str, &str); 9] = [
        (&["부산", "해운대", "광안리"], 35.1796, 129.0756, "부산광역시", "부산지역"),
        (&["제주"], 33.4996, 126.5312, "제주특별자치도", "제주지역"),
        (&["경주"], 35.8562, 129.2247, "경상북도 경주시", "경주지역"),
        (&["강릉", "춘천", "양양"], 37.7519, 128.8761, "강원도", "강원지역"),
        (&["대구"], 35.8714, 128.6014, "대구광역시", "대구지역"),
        (&["인천"], 37.4563, 126.7052, "인천광역시", "인천지역"),
        (&["광주"], 35.1596, 126.8526, "광주광역시", "광주지역"),
        (&["대전"], 36.3504, 127.3845, "대전광역시", "대전지역"),
        (&["울산"], 35.5384, 129.3114, "울산광역시", "울산지역"),
    ];
    let lower = place_name.to_lowercase();
    for (keys, lat, lng, address, search_query) in SMART_TABLE {
        if keys.iter().any(|k| lower.contains(k)) {
            return Geocode {
                lat,
                lng,
                address: address.to_owned(),
                place_name: place_name.to_owned(),
                category: "AI백업".to_owned(),
                search_query: search_query.to_owned(),
                score: 15,
            };
        }
    }
    Geocode {
        lat: 37.5665,
        lng: 126.9780,
        address: "서울특별시 중구".to_owned(),
        place_name: place_name.to_owned(),
        category: "기본백업".to_owned(),
        search_query: "기본좌표".to_owned(),
        score: 10,
    }
}

/// Full offline fallback chain: named region, then place type, then the
/// regional default. Never fails.
pub fn backup_geocode(place_name: &str) -> Geocode {
    region_fallback(place_name)
        .or_else(|| place_type_fallback(place_name))
        .unwrap_or_else(|| smart_backup(place_name))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clean_query_drops_stopwords_and_short_tokens() {
        assert_eq!(clean_query("부산 여행 일정 추천해줘!"), "부산 추천해줘");
        assert_eq!(clean_query("해운대 맛집 추천"), "해운대 맛집");
    }

    #[test]
    fn clean_place_query_leaves_bare_name() {
        assert_eq!(clean_place_query("경복궁 근처 맛집 5곳 알려줘"), "경복궁");
        assert_eq!(clean_place_query("성산일출봉 상세 정보 보여줘"), "성산일출봉");
    }

    #[test]
    fn longer_region_name_wins() {
        assert_eq!(detect_region("제주도 카페"), Some("제주도"));
        assert_eq!(detect_region("제주 카페"), Some("제주"));
        assert_eq!(detect_region("통영 굴구이"), None);
    }

    #[test]
    fn cafe_query_builds_cafe_strategies() {
        let cleaned = clean_query("부산 카페 추천");
        let strategies = search_strategies("부산 카페 추천", &cleaned, PlaceKind::Cafe, Some("부산"));
        assert!(strategies.contains(&"부산 카페".to_owned()));
        assert!(strategies.contains(&"부산 커피".to_owned()));
        assert!(strategies.iter().any(|s| s == "부산 카페 추천"));
    }

    #[test]
    fn exact_name_match_scores_highest() {
        let doc = KakaoDocument {
            place_name: "경복궁".to_owned(),
            address_name: "서울특별시 종로구".to_owned(),
            category_name: "여행 > 관광,명소".to_owned(),
            x: "126.9770".to_owned(),
            y: "37.5796".to_owned(),
            ..KakaoDocument::default()
        };
        let score = score_document(&doc, "경복궁", PlaceKind::Other, Some("서울")).unwrap();
        // 100 name + 20 region address + 10 category + 10 address + 10 coords
        assert_eq!(score, 150);
    }

    #[test]
    fn foreign_coordinates_disqualify_candidate() {
        let doc = KakaoDocument {
            place_name: "경복궁".to_owned(),
            x: "139.6503".to_owned(),
            y: "35.6762".to_owned(),
            ..KakaoDocument::default()
        };
        assert!(score_document(&doc, "경복궁", PlaceKind::Other, None).is_none());
    }

    #[test]
    fn cafe_outside_urban_area_is_penalised() {
        let rural = KakaoDocument {
            place_name: "구름카페".to_owned(),
            category_name: "음식점 > 카페".to_owned(),
            x: "128.2000".to_owned(),
            y: "36.5000".to_owned(),
            ..KakaoDocument::default()
        };
        let urban = KakaoDocument {
            x: "126.9780".to_owned(),
            y: "37.5665".to_owned(),
            ..rural.clone()
        };
        let rural_score = score_document(&rural, "구름카페", PlaceKind::Cafe, None).unwrap();
        let urban_score = score_document(&urban, "구름카페", PlaceKind::Cafe, None).unwrap();
        assert_eq!(urban_score - rural_score, 30);
    }

    #[test]
    fn known_peak_is_pinned() {
        let (lat, lng) = pin_known_coordinates("유달산", "전라남도 목포시", 35.0, 127.0);
        assert_eq!((lat, lng), (34.786800, 126.415300));
        let (lat, lng) = pin_known_coordinates("한라산", "제주특별자치도", 33.36, 126.53);
        assert_eq!((lat, lng), (33.36, 126.53));
    }

    #[test]
    fn backup_prefers_region_over_type() {
        let hit = backup_geocode("부산 자갈치시장");
        assert_eq!(hit.address, "부산광역시");
        assert_eq!(hit.score, 50);
    }

    #[test]
    fn backup_uses_place_type_without_region() {
        let hit = backup_geocode("불국사");
        assert_eq!(hit.address, "사찰 지역");
        assert_eq!(hit.score, 40);
    }

    #[test]
    fn backup_defaults_to_seoul() {
        let hit = backup_geocode("어딘가");
        assert_eq!(hit.address, "서울특별시 중구");
        assert_eq!(hit.score, 10);
        assert_eq!(hit.category, "기본백업");
    }

    #[tokio::test]
    async fn lookup_hits_region_table_without_key() {
        let client = KakaoLocal::new(reqwest::Client::new(), "");
        let hit = client.lookup("홍대 거리").await.unwrap();
        assert_eq!(hit.address, "서울특별시");
        assert_eq!(hit.score, 50);
    }

    #[tokio::test]
    async fn lookup_without_key_or_region_is_none() {
        let client = KakaoLocal::new(reqwest::Client::new(), "");
        assert!(client.lookup("이름모를식당").await.is_none());
    }

    #[tokio::test]
    async fn geocode_without_key_is_none() {
        let client = KakaoLocal::new(reqwest::Client::new(), "");
        assert!(client.geocode("경복궁").await.is_none());
    }
}
