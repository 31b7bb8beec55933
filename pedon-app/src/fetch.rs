//! SOAP client for the USDA Soil Data Access tabular service.

use anyhow::{bail, Context, Result};
use pedon_schemas::coordinate::Coordinate;
use tracing::{debug, info};

const SERVICE_URL: &str = "https://SDMDataAccess.nrcs.usda.gov/Tabular/SDMTabularService.asmx";

/// Blocking client for the SDA tabular endpoint. One coordinate is
/// queried at a time; there are no timeouts and no retries, so a failed
/// request surfaces immediately to the caller.
pub struct SdaClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl SdaClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("pedon/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            url: SERVICE_URL.to_string(),
        })
    }

    /// Points the client at a different endpoint.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Runs the horizon query for one coordinate and returns the raw XML
    /// response body.
    pub fn run_point_query(&self, coordinate: Coordinate) -> Result<String> {
        info!(
            lat = coordinate.lat,
            lon = coordinate.lon,
            "querying soil data access service"
        );
        let response = self
            .http
            .post(&self.url)
            .header("content-type", "text/xml")
            .body(soap_envelope(coordinate))
            .send()
            .with_context(|| {
                format!(
                    "Soil data request failed for ({}, {})",
                    coordinate.lat, coordinate.lon
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Soil data service returned {} for ({}, {})",
                status,
                coordinate.lat,
                coordinate.lon
            );
        }

        let body = response
            .text()
            .context("Failed to read soil data response body")?;
        debug!(bytes = body.len(), "received soil data response");
        Ok(body)
    }
}

/// The SOAP 1.2 `RunQuery` envelope. The embedded SQL selects one row per
/// horizon for every component of the map unit containing the point, with
/// service column names aliased to the report vocabulary.
pub fn soap_envelope(coordinate: Coordinate) -> String {
    let lon_lat = format!("{} {}", coordinate.lon, coordinate.lat);
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
              <soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope" xmlns:sdm="http://SDMDataAccess.nrcs.usda.gov/Tabular/SDMTabularService.asmx">
       <soap:Header/>
       <soap:Body>
          <sdm:RunQuery>
             <sdm:Query>SELECT co.cokey as cokey, ch.chkey as chkey, comppct_r as prcent, slope_r, slope_h as slope, hzname, hzdept_r as deptht, hzdepb_r as depthb, awc_r as awc,
                        claytotal_r as clay, silttotal_r as silt, sandtotal_r as sand, om_r as om, dbthirdbar_r as bulk_density, wthirdbar_r as th33, ph1to1h2o_r as ph, ksat_r as sat_hidric_cond,
                        ec_r as ec, sar_r as sar, caco3_r as caco3, kffact as k_factor, tfact as t_factor, slope_r as rep_slope,
                        wthirdbar_r as water_content_0_1bar, wfifteenbar_r as water_content_15bar, weg as wind_erodibility_group, wei as wind_erodibility_index,
                        dbtenthbar_r as bulk_density_10, wtenthbar_r as water_content_10bar
                        FROM sacatalog sc
                        FULL OUTER JOIN legend lg  ON sc.areasymbol=lg.areasymbol
                        FULL OUTER JOIN mapunit mu ON lg.lkey=mu.lkey
                        FULL OUTER JOIN component co ON mu.mukey=co.mukey
                        FULL OUTER JOIN chorizon ch ON co.cokey=ch.cokey
                        FULL OUTER JOIN chtexturegrp ctg ON ch.chkey=ctg.chkey
                        FULL OUTER JOIN chtexture ct ON ctg.chtgkey=ct.chtgkey
                        FULL OUTER JOIN copmgrp pmg ON co.cokey=pmg.cokey
                        FULL OUTER JOIN corestrictions rt ON co.cokey=rt.cokey
                        WHERE mu.mukey IN (SELECT * from SDA_Get_Mukey_from_intersection_with_WktWgs84('point({lon_lat})')) order by co.cokey, ch.chkey, comppct_r, hzdept_r
            </sdm:Query>
          </sdm:RunQuery>
       </soap:Body>
    </soap:Envelope>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_embeds_the_point_as_lon_lat() {
        let body = soap_envelope(Coordinate {
            lat: 36.589068371399115,
            lon: -98.525390625,
        });
        assert!(body.contains("point(-98.525390625 36.589068371399115)"));
        assert!(body.contains("<sdm:RunQuery>"));
        assert!(body.contains("hzdept_r as deptht"));
    }
}
